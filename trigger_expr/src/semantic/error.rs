use super::functions::ParamKind;
use crate::log_error;
use crate::logging::codes;

/// Semantic failures. Every variant except the global one carries the byte
/// offset of the reference it was found in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SemanticError {
    #[error("Unknown macro \"{{{name}}}\" is used in expression")]
    UnknownMacro { name: String, byte_offset: usize },

    #[error("Incorrect user macro \"{text}\"")]
    InvalidUserMacro { text: String, byte_offset: usize },

    #[error("Incorrect trigger expression. Host name cannot be empty")]
    EmptyHost { byte_offset: usize },

    #[error("Incorrect host name \"{host}\" provided in expression")]
    InvalidHost { host: String, byte_offset: usize },

    #[error("Incorrect trigger expression. Item key cannot be empty")]
    EmptyItemKey { byte_offset: usize },

    #[error("Incorrect item key \"{key}\" provided for trigger expression: {reason}")]
    InvalidItemKey {
        key: String,
        reason: String,
        byte_offset: usize,
    },

    #[error("Unknown function \"{name}\"")]
    UnknownFunction { name: String, byte_offset: usize },

    #[error("Function \"{function}\" does not accept parameters")]
    UnexpectedParameters { function: String, byte_offset: usize },

    #[error("Too many parameters for function \"{function}\": expected at most {expected}, got {supplied}")]
    TooManyParameters {
        function: String,
        expected: usize,
        supplied: usize,
        byte_offset: usize,
    },

    #[error("Missing mandatory parameter {position} for function \"{function}\"")]
    MissingMandatoryParameter {
        function: String,
        /// 1-based
        position: usize,
        byte_offset: usize,
    },

    #[error("Incorrect parameter \"{parameter}\" for function \"{function}\": expected {expected}")]
    ParameterTypeMismatch {
        function: String,
        parameter: String,
        expected: ParamKind,
        byte_offset: usize,
    },

    #[error("Trigger expression must contain at least one host:key reference")]
    MissingHostItemReference,
}

impl SemanticError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            SemanticError::UnknownMacro { .. } => codes::semantic::UNKNOWN_MACRO,
            SemanticError::InvalidUserMacro { .. } => codes::semantic::INVALID_USER_MACRO,
            SemanticError::EmptyHost { .. } => codes::semantic::EMPTY_HOST,
            SemanticError::InvalidHost { .. } => codes::semantic::INVALID_HOST,
            SemanticError::EmptyItemKey { .. } => codes::semantic::EMPTY_ITEM_KEY,
            SemanticError::InvalidItemKey { .. } => codes::semantic::INVALID_ITEM_KEY,
            SemanticError::UnknownFunction { .. } => codes::semantic::UNKNOWN_FUNCTION,
            SemanticError::UnexpectedParameters { .. } => codes::semantic::UNEXPECTED_PARAMETERS,
            SemanticError::TooManyParameters { .. } => codes::semantic::TOO_MANY_PARAMETERS,
            SemanticError::MissingMandatoryParameter { .. } => {
                codes::semantic::MISSING_MANDATORY_PARAMETER
            }
            SemanticError::ParameterTypeMismatch { .. } => codes::semantic::PARAMETER_TYPE_MISMATCH,
            SemanticError::MissingHostItemReference => codes::semantic::MISSING_HOST_ITEM_REFERENCE,
        }
    }

    pub fn byte_offset(&self) -> Option<usize> {
        match self {
            Self::UnknownMacro { byte_offset, .. }
            | Self::InvalidUserMacro { byte_offset, .. }
            | Self::EmptyHost { byte_offset }
            | Self::InvalidHost { byte_offset, .. }
            | Self::EmptyItemKey { byte_offset }
            | Self::InvalidItemKey { byte_offset, .. }
            | Self::UnknownFunction { byte_offset, .. }
            | Self::UnexpectedParameters { byte_offset, .. }
            | Self::TooManyParameters { byte_offset, .. }
            | Self::MissingMandatoryParameter { byte_offset, .. }
            | Self::ParameterTypeMismatch { byte_offset, .. } => Some(*byte_offset),
            Self::MissingHostItemReference => None,
        }
    }

    pub fn log_error(&self) {
        match self.byte_offset() {
            Some(offset) => log_error!(self.error_code(), &self.to_string(),
                span = crate::utils::Span::new(offset, offset),
                "severity" => codes::get_severity(self.error_code().as_str()).as_str()
            ),
            None => log_error!(self.error_code(), &self.to_string(),
                "severity" => codes::get_severity(self.error_code().as_str()).as_str()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let error = SemanticError::UnknownMacro {
            name: "HOST.NAME".to_string(),
            byte_offset: 0,
        };
        assert_eq!(
            error.to_string(),
            "Unknown macro \"{HOST.NAME}\" is used in expression"
        );

        let error = SemanticError::ParameterTypeMismatch {
            function: "nodata".to_string(),
            parameter: "abc".to_string(),
            expected: ParamKind::Sec,
            byte_offset: 3,
        };
        assert!(error.to_string().contains("\"abc\""));
        assert!(error.to_string().contains("seconds"));
    }

    #[test]
    fn test_offsets_and_codes() {
        let error = SemanticError::EmptyHost { byte_offset: 7 };
        assert_eq!(error.byte_offset(), Some(7));
        assert_eq!(error.error_code(), codes::semantic::EMPTY_HOST);

        let error = SemanticError::MissingHostItemReference;
        assert_eq!(error.byte_offset(), None);
        assert_eq!(
            error.error_code(),
            codes::semantic::MISSING_HOST_ITEM_REFERENCE
        );
    }
}
