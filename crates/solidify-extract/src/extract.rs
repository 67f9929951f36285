use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use solidify_types::{FieldError, Token};

use crate::error::{ExtractError, ExtractResult};
use crate::group::{FeatureGroup, DEFAULT_ZERO_VALUE, MAX_GROUP_VALUES};

/// One token's features: type name to value, e.g. `Background -> Black`.
pub type FeaturesMap = BTreeMap<String, String>;

/// Parse a JSON array of `{type: value}` objects.
pub fn parse_features_json<R: Read>(reader: R) -> ExtractResult<Vec<FeaturesMap>> {
    let maps: Vec<FeaturesMap> = serde_json::from_reader(reader)?;
    tracing::debug!(tokens = maps.len(), "parsed features");
    Ok(maps)
}

pub fn load_features_json(path: impl AsRef<Path>) -> ExtractResult<Vec<FeaturesMap>> {
    let file = File::open(path.as_ref())?;
    parse_features_json(BufReader::new(file))
}

/// Collect the feature groups present in `maps`.
///
/// Types are sorted alphabetically, and so are the values of each type.
/// `"None"` is never listed as a value since it is always the zero value.
pub fn extract_feature_groups(maps: &[FeaturesMap]) -> Vec<FeatureGroup> {
    let mut values: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for map in maps {
        for (ty, value) in map {
            values.entry(ty.as_str()).or_default().insert(value.as_str());
        }
    }

    values
        .into_iter()
        .map(|(ty, vals)| {
            let non_zero = vals
                .into_iter()
                .filter(|v| *v != DEFAULT_ZERO_VALUE)
                .map(str::to_owned)
                .collect();
            FeatureGroup::new(ty, non_zero)
        })
        .collect()
}

/// Enumerate each token's features against `groups`.
///
/// `codes[i][j]` is the position of token `i`'s value in `groups[j].values()`.
/// A token without a type gets 0 for it. Fails up front if a group has more
/// values than a one-byte code can tell apart.
pub fn encode_features(
    maps: &[FeaturesMap],
    groups: &[FeatureGroup],
) -> ExtractResult<Vec<Vec<u8>>> {
    if let Some(group) = groups.iter().find(|g| g.num_values() > MAX_GROUP_VALUES) {
        return Err(ExtractError::TooManyValues {
            group: group.name().to_owned(),
            count: group.num_values(),
        });
    }

    maps.iter()
        .enumerate()
        .map(|(token, map)| {
            groups
                .iter()
                .map(|group| match map.get(group.name()) {
                    None => Ok(0),
                    Some(value) => {
                        group
                            .code_of(value)
                            .ok_or_else(|| ExtractError::Encoding {
                                token,
                                source: FieldError::UnknownValue {
                                    group: group.name().to_owned(),
                                    value: value.clone(),
                                },
                            })
                    }
                })
                .collect::<ExtractResult<Vec<u8>>>()
        })
        .collect()
}

/// Wrap encoded features into tokens with sequential ids from 0.
pub fn tokens_from_features(codes: Vec<Vec<u8>>) -> ExtractResult<Vec<Token>> {
    let count = codes.len();
    codes
        .into_iter()
        .enumerate()
        .map(|(i, features)| {
            let id = u16::try_from(i).map_err(|_| ExtractError::TooManyTokens(count))?;
            Ok(Token::new(id, features))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmap(pairs: &[(&str, &str)]) -> FeaturesMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn group(ty: &str, vals: &[&str]) -> FeatureGroup {
        FeatureGroup::new(ty, vals.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn extract_single_token() {
        let got = extract_feature_groups(&[fmap(&[("t0", "f01"), ("t1", "f11")])]);
        assert_eq!(got, vec![group("t0", &["f01"]), group("t1", &["f11"])]);
    }

    #[test]
    fn extract_ignores_empty_tokens() {
        let got = extract_feature_groups(&[fmap(&[("t0", "f01"), ("t1", "f11")]), fmap(&[])]);
        assert_eq!(got, vec![group("t0", &["f01"]), group("t1", &["f11"])]);
    }

    #[test]
    fn extract_sorts_and_drops_none() {
        let got = extract_feature_groups(&[
            fmap(&[("t2", "f21"), ("t0", "f02")]),
            fmap(&[("t1", "f11"), ("t0", "f01"), ("t2", "None")]),
        ]);
        assert_eq!(
            got,
            vec![
                group("t0", &["f01", "f02"]),
                group("t1", &["f11"]),
                group("t2", &["f21"]),
            ]
        );
    }

    #[test]
    fn encode_uses_value_positions() {
        let got = encode_features(
            &[fmap(&[("t0", "f01"), ("t1", "f11")])],
            &[group("t0", &["f01"]), group("t1", &["f10", "f11"])],
        )
        .unwrap();
        assert_eq!(got, vec![vec![1, 2]]);
    }

    #[test]
    fn encode_missing_type_is_zero() {
        let got = encode_features(
            &[fmap(&[("t0", "f01"), ("t1", "f11")]), fmap(&[])],
            &[group("t0", &["f01"]), group("t1", &["f11"])],
        )
        .unwrap();
        assert_eq!(got, vec![vec![1, 1], vec![0, 0]]);
    }

    #[test]
    fn encode_explicit_none_is_zero() {
        let got = encode_features(&[fmap(&[("t0", "None")])], &[group("t0", &["f01"])]).unwrap();
        assert_eq!(got, vec![vec![0]]);
    }

    #[test]
    fn encode_unknown_value_fails() {
        let err = encode_features(&[fmap(&[("t0", "XXX")])], &[group("t0", &["f01"])]).unwrap_err();
        assert!(err.to_string().contains("unknown feature value"));
        match err {
            ExtractError::Encoding { token, source } => {
                assert_eq!(token, 0);
                assert_eq!(
                    source,
                    FieldError::UnknownValue {
                        group: "t0".into(),
                        value: "XXX".into(),
                    }
                );
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn encode_rejects_groups_past_byte_codes() {
        let values: Vec<String> = (0..300).map(|i| format!("v{i:03}")).collect();
        let big = FeatureGroup::new("Hat", values);
        let err = encode_features(&[fmap(&[("Hat", "v280")])], &[big]).unwrap_err();
        match err {
            ExtractError::TooManyValues { group, count } => {
                assert_eq!(group, "Hat");
                assert_eq!(count, 301);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn encode_uses_full_byte_range() {
        let values: Vec<String> = (1..256).map(|i| format!("v{i:03}")).collect();
        let full = FeatureGroup::new("Hat", values);
        assert_eq!(full.num_values(), MAX_GROUP_VALUES);
        let got = encode_features(&[fmap(&[("Hat", "v255")])], &[full]).unwrap();
        assert_eq!(got, vec![vec![255]]);
    }

    #[test]
    fn parse_metadata_json() {
        let json = r#"[
            {
                "Specie": "Owl",
                "Eyes": "Angry - Yellow",
                "Outerwear": "Hoodie Down",
                "Headwear": "None"
            },
            {
                "Specie": "Owl",
                "Eyes": "Angry - Purple",
                "Outerwear": "None",
                "Eyewear": "Eyepatch",
                "Headwear": "Skully"
            }
        ]"#;

        let got = parse_features_json(json.as_bytes()).unwrap();
        assert_eq!(
            got,
            vec![
                fmap(&[
                    ("Specie", "Owl"),
                    ("Eyes", "Angry - Yellow"),
                    ("Outerwear", "Hoodie Down"),
                    ("Headwear", "None"),
                ]),
                fmap(&[
                    ("Specie", "Owl"),
                    ("Eyes", "Angry - Purple"),
                    ("Headwear", "Skully"),
                    ("Eyewear", "Eyepatch"),
                    ("Outerwear", "None"),
                ]),
            ]
        );
    }

    #[test]
    fn parse_rejects_non_string_values() {
        let err = parse_features_json(r#"[{"Body": 3}]"#.as_bytes()).unwrap_err();
        assert!(matches!(err, ExtractError::Json(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traits.json");
        std::fs::write(&path, r#"[{"Body": "Robot"}, {"Body": "Alien"}]"#).unwrap();

        let maps = load_features_json(&path).unwrap();
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[1]["Body"], "Alien");

        let missing = load_features_json(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, ExtractError::Io(_)));
    }

    #[test]
    fn tokens_are_numbered_from_zero() {
        let tokens = tokens_from_features(vec![vec![1, 0], vec![0, 2]]).unwrap();
        assert_eq!(tokens[0], Token::new(0, vec![1, 0]));
        assert_eq!(tokens[1], Token::new(1, vec![0, 2]));
    }
}
