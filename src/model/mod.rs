pub(crate) mod size;
pub(crate) mod source;
pub(crate) mod spec;
