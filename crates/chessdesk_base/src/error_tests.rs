/* 📖 # Why keep the error tests in a separate file?

Some of these tests look at rendered span traces, which embed source line numbers.
Keeping them apart from the error module keeps those numbers stable while the
error module changes.
*/

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::{DeskError, DeskResult, ResultExt};
    use expect_test::expect;
    use std::error::Error;
    use std::io;
    use std::path::PathBuf;
    use tracing::span;
    use tracing_error::ErrorLayer;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    /// Installs a subscriber with the ErrorLayer; `try_init` tolerates other tests doing the same.
    fn setup_tracing_subscriber() {
        let _ = tracing_subscriber::registry()
            .with(ErrorLayer::default())
            .try_init();
    }

    #[test]
    fn test_error_from_file_error() {
        let path = PathBuf::from("chessdesk.toml");
        let error = DeskError::new(ErrorKind::FileError {
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
        });

        match error.kind() {
            ErrorKind::FileError { path: p, .. } => assert_eq!(p, &path),
            _ => panic!("Expected FileError variant"),
        }
        assert!(error.source().is_some());
        assert_eq!(error.root_cause().to_string(), "file not found");
    }

    #[test]
    fn test_error_message_and_context() {
        let error = DeskError::message("original error")
            .context("first context")
            .with_context(|| "second context".to_string());

        assert_eq!(error.get_context(), ["first context", "second context"]);
        assert_eq!(
            error.to_string(),
            "first context: second context: original error"
        );
        assert_eq!(error.bare_message(), "original error");
        assert!(error.source().is_none());
    }

    #[test]
    fn test_error_from_kind() {
        let error: DeskError = ErrorKind::Message {
            message: "test".to_string(),
        }
        .into();
        assert_eq!(error.to_string(), "test");
    }

    #[test]
    fn test_cause_is_exposed_as_source() {
        let error = DeskError::message("outer").caused_by(DeskError::message("inner"));
        assert_eq!(error.cause().map(|c| c.bare_message()), Some("inner".into()));
        assert_eq!(error.root_cause().to_string(), "inner");
    }

    #[test]
    fn test_result_ext_chaining() {
        let result: DeskResult<i32> = Err(Box::new(DeskError::message("root")));
        let err = result
            .context("step 1")
            .with_context(|| "step 2".to_string())
            .unwrap_err();
        assert_eq!(err.to_string(), "step 1: step 2: root");
    }

    #[test]
    fn test_result_ext_success_untouched() {
        let result: DeskResult<i32> = Ok(42);
        assert_eq!(result.context("never shown").unwrap(), 42);
    }

    #[test]
    fn test_err_and_bail_macros() {
        fn failing(value: u32) -> DeskResult<u32> {
            if value > 3 {
                crate::bail!("value {} too large", value);
            }
            Ok(value)
        }

        assert_eq!(failing(2).unwrap(), 2);
        assert_eq!(failing(7).unwrap_err().to_string(), "value 7 too large");
        let boxed: Box<DeskError> = crate::err!("port {} in use", 8080);
        assert_eq!(boxed.to_string(), "port 8080 in use");
    }

    #[test]
    fn test_debug_tree_without_span() {
        let inner = DeskError::message("inner error").context("inner context");
        let outer = DeskError::message("outer error")
            .context("outer context")
            .caused_by(inner);

        expect![[r#"
            outer error
            ├─ outer context
            └─ cause: inner error
               └─ inner context
        "#]]
        .assert_eq(&format!("{:?}", outer));
    }

    #[test]
    fn test_debug_tree_nested_causes() {
        let error_1 = DeskError::message("error 1").context("context 1");
        let error_2 = DeskError::message("error 2")
            .context("context 2")
            .caused_by(error_1);
        let error_3 = DeskError::message("error 3")
            .context("context 3")
            .caused_by(error_2);

        expect![[r#"
            error 3
            ├─ context 3
            └─ cause: error 2
               ├─ context 2
               └─ cause: error 1
                  └─ context 1
        "#]]
        .assert_eq(&format!("{:?}", error_3));
    }

    #[test]
    fn test_debug_includes_span_trace() {
        setup_tracing_subscriber();

        let operation_span = span!(tracing::Level::DEBUG, "load_config", attempt = 1);
        let _guard = operation_span.enter();

        let error = DeskError::message("config unreadable");
        let rendered = format!("{:?}", error);

        assert!(rendered.starts_with("config unreadable\n"));
        assert!(rendered.contains("Trace:"));
        assert!(rendered.contains("load_config"));
        assert!(rendered.contains("attempt=1"));
    }
}
