mod http;
mod provider;
mod serialized;

pub use http::{HttpEmbedderConfig, HttpImageEmbedder};
#[cfg(test)]
pub use provider::MockImageEmbedder;
pub use provider::ImageEmbedder;
pub use serialized::SerializedEmbedder;
