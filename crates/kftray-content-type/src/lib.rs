pub mod body;
pub mod category;
pub mod config;
pub mod error;
pub mod extension;
pub mod formatters;
pub mod media_type;
pub mod pretty;
pub mod sink;

pub use body::{
    BodyFormatter,
    FormattedBody,
};
pub use category::Category;
pub use config::FormatConfig;
pub use error::{
    FormatError,
    MediaTypeError,
};
pub use extension::infer_extension;
pub use formatters::TidyOptions;
pub use media_type::{
    classify,
    NormalizedContentType,
};
pub use pretty::{
    pretty_print,
    PrettyPrinter,
};
pub use sink::{
    NoopSink,
    TracingSink,
    WarnSink,
};
