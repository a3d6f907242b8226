#![no_main]

use kftray_content_type::{
    classify,
    infer_extension,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let content_type = classify(data);
    assert_eq!(content_type, classify(content_type.media_type()));
    let _ = infer_extension(content_type.category(), content_type.media_type(), data);
});
