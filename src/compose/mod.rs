pub(crate) mod avatar;
pub(crate) mod group;
