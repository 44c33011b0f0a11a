#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use futures::executor::block_on;
use libfuzzer_sys::fuzz_target;
use mutable_image::{Edit, HandleState, MutableImage, Rectangle};

#[derive(Arbitrary, Debug)]
struct EditSeed {
    kind: bool,
    a: i16,
    b: i16,
    c: u8,
    d: u8,
}

fn seed_to_edit(seed: EditSeed) -> Edit {
    if seed.kind {
        Edit::Scale {
            factor: (seed.c as f64 + 1.0) / 64.0,
        }
    } else {
        Edit::Crop {
            region: Rectangle::new(seed.a as i32, seed.b as i32, seed.c as u32, seed.d as u32),
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let seeds: Vec<EditSeed> = Arbitrary::arbitrary(&mut u).unwrap_or_default();
    let bytes = u.take_rest().to_vec();

    let mut handle = MutableImage::new(bytes.clone());
    block_on(async {
        for seed in seeds.into_iter().take(8) {
            // Codec errors are fine; panics are not.
            let _ = handle.apply(&seed_to_edit(seed)).await;
        }
        if let Ok(serialized) = handle.as_serialized().await {
            let buffer = serialized.buffer.to_vec();
            if handle.state() == HandleState::Undecodable {
                assert_eq!(buffer, bytes);
            }
        }
    });
});
