// cargo fuzz run parse corpus/parse -- -timeout=30

#![no_main]

use std::io::Cursor;
use libfuzzer_sys::fuzz_target;

use gifparse::Decoder;

fuzz_target!(|data: &[u8]| {
    if let Ok(gif) = Decoder::new(Cursor::new(data)).parse() {
        for index in 0..gif.frame_count() {
            if gif.render_resized(index, 16).is_err() {
                return;
            }
        }
    }
});
