use crate::model::user::Role;

/// The access level a route demands from its caller.
pub trait Rights: Send + Sync + 'static {
    /// Name used in rejection messages.
    const NAME: &'static str;

    /// Does a user with the given role satisfy this access level?
    fn permits(role: Role) -> bool;
}

/// Any signed-in user, admins included.
pub struct Member;

/// Admin users only.
pub struct Admin;

impl Rights for Member {
    const NAME: &'static str = "member";

    fn permits(_role: Role) -> bool {
        true
    }
}

impl Rights for Admin {
    const NAME: &'static str = "admin";

    fn permits(role: Role) -> bool {
        role == Role::Admin
    }
}
