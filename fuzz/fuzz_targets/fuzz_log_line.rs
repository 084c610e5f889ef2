#![no_main]

use libfuzzer_sys::fuzz_target;

use stack_errors::StructuredError;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mid = text
        .char_indices()
        .map(|(idx, _)| idx)
        .find(|&idx| idx >= text.len() / 2)
        .unwrap_or(text.len());
    let (code, message) = text.split_at(mid);

    let err = StructuredError::wrap(code.to_string(), message.to_string(), message.to_string());
    err.metadata().insert(code.to_string(), message.to_string());

    let mut line = String::new();
    err.log_record().write_to(&mut line).expect("write to String");
    assert!(line.starts_with('['));
    assert!(line.ends_with(']'));
});
