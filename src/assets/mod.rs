pub(crate) mod decode;
pub(crate) mod glyphs;
pub(crate) mod image;
pub(crate) mod svg_raster;
