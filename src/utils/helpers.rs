use actix_web::HttpRequest;
use chrono::Utc;
use rand::Rng;

/// Collision resistant base name for an uploaded file: unix seconds, a random
/// component, then the sub-second microseconds.
pub fn generate_upload_base_name() -> String {
    let now = Utc::now();
    let mut rng = rand::rng();
    let salt: u32 = rng.random_range(0..=100_000);
    format!(
        "{}{}{:06}",
        now.timestamp(),
        salt,
        now.timestamp_subsec_micros()
    )
}

/// Form booleans arrive as `"true"`/`"false"` strings; anything else is false.
pub fn form_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Whether the caller is the discussion front end issuing an XHR.
pub fn is_ajax(req: &HttpRequest) -> bool {
    req.headers()
        .get("X-Requested-With")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == "XMLHttpRequest")
}

/// `true` when the value is missing or only whitespace.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn upload_names_are_numeric_and_distinct() {
        let first = generate_upload_base_name();
        assert!(first.chars().all(|c| c.is_ascii_digit()));
        assert!(first.len() > 10);
        let names: std::collections::HashSet<String> =
            (0..20).map(|_| generate_upload_base_name()).collect();
        assert!(names.len() > 1);
    }

    #[test]
    fn form_flags() {
        assert!(form_flag(Some("True")));
        assert!(!form_flag(Some("false")));
        assert!(!form_flag(Some("1")));
        assert!(!form_flag(None));
    }

    #[test]
    fn blank_values() {
        assert!(is_blank(None));
        assert!(is_blank(Some("  \n")));
        assert!(!is_blank(Some(" x ")));
    }

    #[test]
    fn detects_xhr() {
        let req = TestRequest::default()
            .insert_header(("X-Requested-With", "XMLHttpRequest"))
            .to_http_request();
        assert!(is_ajax(&req));
        assert!(!is_ajax(&TestRequest::default().to_http_request()));
    }
}
