pub mod candidate;
pub mod company;
pub mod html_tag;

pub use candidate::*;
pub use company::*;
