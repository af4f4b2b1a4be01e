use tonic::{Code, Status};
use verified_actor::{AuthError, ErrorClass};

/// The gRPC code reported for an error class.
#[must_use]
pub fn code_for(class: ErrorClass) -> Code {
    match class {
        ErrorClass::InvalidArgument => Code::InvalidArgument,
        ErrorClass::Unauthenticated => Code::Unauthenticated,
        ErrorClass::Internal => Code::Internal,
    }
}

/// Convert an [`AuthError`] into the status reported to the client.
///
/// Decoding failures are reported without the parser detail so the header
/// content does not leak back to the caller.
#[must_use]
pub fn to_status(err: &AuthError) -> Status {
    let code = code_for(err.class());
    match err {
        AuthError::Decoding(_) => Status::new(code, "malformed verified claims"),
        _ => Status::new(code, err.to_string()),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn maps_classes_to_codes() {
        assert_eq!(code_for(ErrorClass::InvalidArgument), Code::InvalidArgument);
        assert_eq!(code_for(ErrorClass::Unauthenticated), Code::Unauthenticated);
        assert_eq!(code_for(ErrorClass::Internal), Code::Internal);
    }

    #[test]
    fn no_actor_is_unauthenticated() {
        let status = to_status(&AuthError::NoActor);
        assert_eq!(status.code(), Code::Unauthenticated);
        assert_eq!(status.message(), "no actor in context");
    }

    #[test]
    fn no_action_is_internal() {
        assert_eq!(to_status(&AuthError::NoAction).code(), Code::Internal);
    }

    #[test]
    fn decoding_status_hides_parser_detail() {
        let err = serde_json::from_str::<serde_json::Value>(r#"{"secret": tru"#).unwrap_err();
        let status = to_status(&AuthError::Decoding(err));

        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "malformed verified claims");
    }

    #[test]
    fn invalid_subject_status_names_the_subject() {
        let err = AuthError::InvalidSubject {
            subject: "not-a-valid-subject".to_owned(),
            reason: "expected exactly two '/'-separated segments".to_owned(),
        };
        let status = to_status(&err);

        assert_eq!(status.code(), Code::InvalidArgument);
        assert!(status.message().contains("not-a-valid-subject"));
    }
}
