#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mutable_image::{intersect, tile_iter, Rectangle, Size};

#[derive(Arbitrary, Debug)]
struct Input {
    left: i32,
    top: i32,
    width: u16,
    height: u16,
    max_width: u8,
    max_height: u8,
}

fuzz_target!(|input: Input| {
    let region = Rectangle::new(
        input.left,
        input.top,
        input.width as u32,
        input.height as u32,
    );
    let max = Size::new(input.max_width as u32, input.max_height as u32);

    let tiles = tile_iter(region, max);
    let expected = tiles.len();
    let mut seen = 0usize;
    for t in tiles.take(4096) {
        assert!(!t.is_empty());
        assert!(t.width <= max.width && t.height <= max.height);
        assert_eq!(intersect(t, region), t);
        seen += 1;
    }
    assert_eq!(seen, expected.min(4096));
});
