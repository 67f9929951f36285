use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use solidify_types::Token;

use crate::error::ExtractResult;
use crate::group::FeatureGroup;

#[derive(Serialize)]
struct FeaturesDocument<'a> {
    features: Vec<BTreeMap<&'a str, u8>>,
}

/// Write `{"features": [{type: code, ..}, ..]}`, one object per token.
///
/// Used by external tooling to check on-chain reads against the encoded
/// features. Output is indented by a single space and ends with a newline.
pub fn write_features_json<W: Write>(
    groups: &[FeatureGroup],
    tokens: &[Token],
    mut writer: W,
) -> ExtractResult<()> {
    let features: Vec<BTreeMap<&str, u8>> = tokens
        .iter()
        .map(|t| {
            groups
                .iter()
                .zip(t.features.iter())
                .map(|(g, code)| (g.name(), *code))
                .collect()
        })
        .collect();

    let doc = FeaturesDocument { features };
    let mut ser =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b" "));
    doc.serialize(&mut ser)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_codes_by_type_name() {
        let groups = vec![
            FeatureGroup::new("Body", vec!["Robot".into()]),
            FeatureGroup::new("Eyes", vec!["Blue".into(), "Red".into()]),
        ];
        let tokens = vec![Token::new(0, vec![1, 2]), Token::new(1, vec![0, 1])];

        let mut out = Vec::new();
        write_features_json(&groups, &tokens, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.ends_with("}\n"));
        assert!(text.starts_with("{\n \"features\": ["));

        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!({
                "features": [
                    {"Body": 1, "Eyes": 2},
                    {"Body": 0, "Eyes": 1},
                ]
            })
        );
    }

    #[test]
    fn empty_collection() {
        let mut out = Vec::new();
        write_features_json(&[], &[], &mut out).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, serde_json::json!({"features": []}));
    }
}
