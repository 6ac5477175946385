// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use poonji_mitra_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn validation_error_is_bare_message() {
        let err = CoreError::ValidationError("Query cannot be empty.".into());
        assert_eq!(err.to_string(), "Query cannot be empty.");
    }

    #[test]
    fn client_not_found() {
        let err = CoreError::ClientNotFound("c-1".into());
        assert_eq!(err.to_string(), "Client not found: c-1");
    }

    #[test]
    fn remote() {
        let err = CoreError::remote("Gemini", "HTTP 429: quota exceeded");
        assert_eq!(
            err.to_string(),
            "AI gateway error (Gemini): HTTP 429: quota exceeded"
        );
    }

    #[test]
    fn network() {
        let err = CoreError::Network("connection reset".into());
        assert_eq!(err.to_string(), "Network error: connection reset");
    }

    #[test]
    fn empty_result_is_bare_message() {
        let err = CoreError::EmptyResult("AI did not return any price data. Please try again.".into());
        assert_eq!(
            err.to_string(),
            "AI did not return any price data. Please try again."
        );
    }

    #[test]
    fn config() {
        let err = CoreError::Config("model must not be empty".into());
        assert_eq!(err.to_string(), "Invalid configuration: model must not be empty");
    }

    #[test]
    fn no_runtime() {
        assert!(CoreError::NoRuntime.to_string().contains("runtime"));
    }
}

// ── Classification ──────────────────────────────────────────────────

mod classification {
    use super::*;

    #[test]
    fn gateway_failures_are_remote() {
        assert!(CoreError::remote("Gemini", "x").is_remote());
        assert!(CoreError::Network("x".into()).is_remote());
        assert!(CoreError::EmptyResult("x".into()).is_remote());
    }

    #[test]
    fn local_failures_are_not_remote() {
        assert!(!CoreError::ValidationError("x".into()).is_remote());
        assert!(!CoreError::ClientNotFound("x".into()).is_remote());
        assert!(!CoreError::Config("x".into()).is_remote());
        assert!(!CoreError::NoRuntime.is_remote());
    }

    #[test]
    fn remote_helper_builds_struct_variant() {
        let err = CoreError::remote("Gemini", "blocked");
        assert_eq!(
            err,
            CoreError::Remote {
                provider: "Gemini".into(),
                message: "blocked".into(),
            }
        );
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn serde_json_error_becomes_deserialization() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn question_mark_converts_serde_errors() {
        fn parse(s: &str) -> Result<Vec<u32>, CoreError> {
            Ok(serde_json::from_str(s)?)
        }
        assert_eq!(parse("[1,2]").unwrap(), vec![1, 2]);
        assert!(matches!(parse("[1,"), Err(CoreError::Deserialization(_))));
    }
}
