pub(crate) mod styler;
