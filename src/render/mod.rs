pub mod colors;
pub mod cushion;
pub mod highlight;
pub mod pixels;
