pub(crate) mod assistant;
pub(crate) mod contact;
pub(crate) mod health;
