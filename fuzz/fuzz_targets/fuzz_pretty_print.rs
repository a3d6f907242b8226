#![no_main]

use kftray_content_type::{
    Category,
    NoopSink,
    PrettyPrinter,
};
use libfuzzer_sys::fuzz_target;

const CATEGORIES: [Category; 3] = [Category::Xml, Category::Json, Category::Html];

fuzz_target!(|data: (u8, &str)| {
    let (selector, body) = data;
    let category = CATEGORIES[selector as usize % CATEGORIES.len()];
    let _ = PrettyPrinter::default().pretty_print(category, body, &NoopSink);
});
