/// Builds `validator::ValidationErrors` inline:
///
/// `validation_errors!({"email": ["email" => "User with this email already exists"]})`
#[macro_export]
macro_rules! validation_errors {
    ({$($field:tt: [$($code:tt => $message:expr),*]),*}) => {{
        let mut errors = ::validator::ValidationErrors::new();
        $(
            $(
                errors.add(
                    $field,
                    ::validator::ValidationError {
                        code: ::std::borrow::Cow::from($code),
                        message: Some(::std::borrow::Cow::from($message)),
                        params: ::std::collections::HashMap::new(),
                    },
                );
            )*
        )*
        errors
    }};
}
