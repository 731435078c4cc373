/// Request-scoped identity that log calls can be attributed to.
///
/// Implemented by whatever type the service uses to carry the authenticated
/// caller through a request.
pub trait Identity {
    fn user_id(&self) -> Option<i64>;

    fn user_email(&self) -> Option<&str> {
        None
    }
}
