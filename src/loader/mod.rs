pub(crate) mod fetch;
pub(crate) mod mailbox;
pub(crate) mod remote;
pub(crate) mod state;
