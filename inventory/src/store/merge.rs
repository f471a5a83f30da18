//! エンドポイントパラメータと機密情報のマージ

use api_inventory_common::types::{EndpointParam, SensitiveParam, SubType};

/// 機密登録済みのパラメータに `savedAsSensitive` と既定サブタイプを付与した新しい一覧を返す
///
/// 対象は `sensitive` が真で、かつ自身の subType を持たない登録のみ。
/// 同じ (param, isHeader, responseCode) を持つ最初のパラメータへ反映する。
pub fn merge_sensitive_params(
    params: &[EndpointParam],
    sensitive: &[SensitiveParam],
) -> Vec<EndpointParam> {
    let mut merged = params.to_vec();

    for entry in sensitive
        .iter()
        .filter(|s| s.sensitive && s.sub_type.is_none())
    {
        if let Some(param) = merged.iter_mut().find(|p| entry.same_param(p)) {
            param.saved_as_sensitive = true;
            if param.sub_type.is_none() {
                param.sub_type = Some(SubType::custom());
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, is_header: bool, response_code: i32) -> EndpointParam {
        EndpointParam {
            url: "/login".to_string(),
            method: "POST".to_string(),
            api_collection_id: 1,
            param: name.to_string(),
            is_header,
            response_code,
            sub_type: None,
            saved_as_sensitive: false,
            extra: Default::default(),
        }
    }

    fn entry(name: &str, is_header: bool, response_code: i32) -> SensitiveParam {
        SensitiveParam {
            url: "/login".to_string(),
            method: "POST".to_string(),
            api_collection_id: 1,
            param: name.to_string(),
            is_header,
            response_code,
            sub_type: None,
            sensitive: true,
        }
    }

    #[test]
    fn test_marks_matching_param() {
        let params = vec![param("password", false, -1), param("token", true, 200)];
        let merged = merge_sensitive_params(&params, &[entry("token", true, 200)]);

        assert!(!merged[0].saved_as_sensitive);
        assert!(merged[1].saved_as_sensitive);
        assert_eq!(merged[1].sub_type, Some(SubType::custom()));
        // 入力は変更しない
        assert!(!params[1].saved_as_sensitive);
    }

    #[test]
    fn test_keeps_existing_sub_type() {
        let mut tagged = param("email", false, -1);
        tagged.sub_type = Some(SubType::new("EMAIL"));

        let merged = merge_sensitive_params(&[tagged], &[entry("email", false, -1)]);

        assert!(merged[0].saved_as_sensitive);
        assert_eq!(merged[0].sub_type, Some(SubType::new("EMAIL")));
    }

    #[test]
    fn test_ignores_tagged_or_unflagged_entries() {
        let params = vec![param("email", false, -1), param("ssn", false, -1)];
        let mut tagged = entry("email", false, -1);
        tagged.sub_type = Some(SubType::new("EMAIL"));
        let mut unflagged = entry("ssn", false, -1);
        unflagged.sensitive = false;

        let merged = merge_sensitive_params(&params, &[tagged, unflagged]);

        assert!(merged.iter().all(|p| !p.saved_as_sensitive));
    }

    #[test]
    fn test_requires_header_and_response_code_match() {
        let params = vec![param("token", false, 200)];
        let merged = merge_sensitive_params(
            &params,
            &[entry("token", true, 200), entry("token", false, -1)],
        );

        assert!(!merged[0].saved_as_sensitive);
    }
}
