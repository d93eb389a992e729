use dctpack::compression::entropy::{HuffmanDecoder, HuffmanEncoder};
use dctpack::compression::{compress, decompress};
use dctpack::{CompressedImage, PackError, Pixel, Raster};
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn max_channel_error(a: &Raster, b: &Raster) -> i32 {
    a.pixels()
        .iter()
        .zip(b.pixels())
        .flat_map(|(p, q)| {
            let (p, q) = (p.to_rgb8(), q.to_rgb8());
            (0..3).map(move |c| (p[c] as i32 - q[c] as i32).abs())
        })
        .max()
        .unwrap_or(0)
}

#[test]
fn flat_color_survives_persist_and_load() {
    let raster = Raster::from_fn(16, 16, |_, _| Pixel::from_rgb(200.0, 100.0, 50.0));

    let bytes = compress(&raster, 70).unwrap().to_bytes().unwrap();
    let loaded = CompressedImage::from_bytes(&bytes).unwrap();
    let restored = decompress(&loaded).unwrap();

    assert_eq!((restored.height(), restored.width()), (16, 16));
    assert!(max_channel_error(&raster, &restored) <= 2);
}

#[test]
fn noisy_image_stays_close_on_average() {
    let mut rng = StdRng::seed_from_u64(42);
    let raster = Raster::from_fn(32, 32, |row, col| {
        let base = 60.0 + (row + col) as f64 * 2.0;
        Pixel::from_rgb(
            base + rng.gen_range(-4.0..4.0),
            base * 0.8 + rng.gen_range(-4.0..4.0),
            150.0 - base * 0.3,
        )
    });

    let restored = decompress(&compress(&raster, 60).unwrap()).unwrap();

    let total: i64 = raster
        .pixels()
        .iter()
        .zip(restored.pixels())
        .map(|(p, q)| {
            let (p, q) = (p.to_rgb8(), q.to_rgb8());
            (0..3).map(|c| (p[c] as i64 - q[c] as i64).abs()).sum::<i64>()
        })
        .sum();
    let mean = total as f64 / (32.0 * 32.0 * 3.0);
    assert!(mean < 8.0, "mean abs error {}", mean);
}

#[test]
fn lower_quality_packs_smaller() {
    let mut rng = StdRng::seed_from_u64(7);
    let raster = Raster::from_fn(64, 64, |_, _| {
        Pixel::from_rgb(
            rng.gen_range(80.0..170.0),
            rng.gen_range(80.0..170.0),
            rng.gen_range(80.0..170.0),
        )
    });

    let coarse = compress(&raster, 10).unwrap();
    let fine = compress(&raster, 70).unwrap();
    assert!(coarse.bits_count < fine.bits_count);
}

#[test]
fn truncated_record_is_rejected() {
    let raster = Raster::from_fn(8, 8, |r, c| {
        Pixel::from_rgb((r * 20) as f64, (c * 20) as f64, 90.0)
    });
    let bytes = compress(&raster, 70).unwrap().to_bytes().unwrap();

    for cut in [9, 20, bytes.len() / 2, bytes.len() - 1] {
        assert!(
            CompressedImage::from_bytes(&bytes[..cut]).is_err(),
            "cut at {}",
            cut
        );
    }
}

#[test]
fn overclaimed_bit_count_is_rejected() {
    let raster = Raster::from_fn(8, 8, |_, _| Pixel::from_rgb(10.0, 20.0, 30.0));
    let mut record = compress(&raster, 70).unwrap();
    record.bits_count = record.data.len() as u64 * 8 + 1;

    assert!(matches!(
        decompress(&record),
        Err(PackError::Truncated { .. })
    ));
    let bytes = record.to_bytes().unwrap();
    assert!(matches!(
        CompressedImage::from_bytes(&bytes),
        Err(PackError::Truncated { .. })
    ));
}

#[test]
fn inflated_dimensions_are_rejected_without_allocating() {
    let raster = Raster::from_fn(8, 8, |_, _| Pixel::from_rgb(120.0, 130.0, 140.0));
    let record = compress(&raster, 70).unwrap();

    for dim in [0xFFFF_FFF8u32, 65536] {
        let mut inflated = record.clone();
        inflated.height = dim;
        inflated.width = dim;

        let loaded = CompressedImage::from_bytes(&inflated.to_bytes().unwrap()).unwrap();
        assert_eq!((loaded.height, loaded.width), (dim, dim));
        assert!(
            matches!(decompress(&loaded), Err(PackError::DecodingError(_))),
            "{}x{}",
            dim,
            dim
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]
    #[test]
    fn prop_huffman_roundtrip(input in proptest::collection::vec(any::<u8>(), 1..2048)) {
        let encoded = HuffmanEncoder::encode(&input).unwrap();
        let decoded =
            HuffmanDecoder::decode(&encoded.data, &encoded.table, encoded.bits_count).unwrap();
        prop_assert_eq!(decoded, input);
        prop_assert!(encoded.bits_count <= encoded.data.len() as u64 * 8);
        prop_assert!(encoded.bits_count + 8 > encoded.data.len() as u64 * 8);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]
    #[test]
    fn prop_record_roundtrip(
        blocks_high in 1usize..4,
        blocks_wide in 1usize..4,
        quality in 1u8..=99,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let raster = Raster::from_fn(blocks_high * 8, blocks_wide * 8, |_, _| {
            Pixel::from_rgb(
                rng.gen_range(0.0..256.0),
                rng.gen_range(0.0..256.0),
                rng.gen_range(0.0..256.0),
            )
        });

        let record = compress(&raster, quality).unwrap();
        let loaded = CompressedImage::from_bytes(&record.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(&loaded, &record);

        let restored = decompress(&loaded).unwrap();
        prop_assert_eq!(restored.height(), blocks_high * 8);
        prop_assert_eq!(restored.width(), blocks_wide * 8);
    }
}
