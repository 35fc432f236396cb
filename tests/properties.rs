// Property tests for the color formatter and the extractors.
use image_to_palette_wasm::{
    ColorSample, DecodeError, ExtractionError, HexColor, ImageDecoder, KMeans, MedianCut,
    PaletteExtractor, PixelSurface, to_hex,
};
use proptest::prelude::*;

fn surface_strategy() -> impl Strategy<Value = PixelSurface> {
    (1u32..8, 1u32..8).prop_flat_map(|(w, h)| {
        prop::collection::vec(any::<u8>(), (w * h * 4) as usize)
            .prop_map(move |samples| PixelSurface::new(w, h, samples).unwrap())
    })
}

proptest! {
    #[test]
    fn hex_is_canonical_and_round_trips(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        let hex = to_hex(ColorSample::new(r, g, b));
        let text = hex.to_string();
        prop_assert_eq!(text.len(), 7);
        prop_assert!(text.starts_with('#'));
        prop_assert!(text[1..].chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));

        let parsed: HexColor = text.parse().unwrap();
        prop_assert_eq!(parsed.to_rgb(), ColorSample::new(r, g, b));
    }

    #[test]
    fn median_cut_length_is_bounded(surface in surface_strategy(), count in 1usize..=20) {
        let palette = MedianCut::default().extract(&surface, count).unwrap();
        prop_assert!(palette.len() >= 1 && palette.len() <= count);
        let populations: Vec<u64> = palette.entries().iter().map(|e| e.population).collect();
        prop_assert!(populations.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn kmeans_length_is_bounded(surface in surface_strategy(), count in 1usize..=20) {
        let palette = KMeans::default().extract(&surface, count).unwrap();
        prop_assert!(palette.len() >= 1 && palette.len() <= count);
    }

    #[test]
    fn flat_surface_yields_its_color(
        rgba in any::<[u8; 4]>(),
        w in 1u32..6,
        h in 1u32..6,
        count in 1usize..=20,
    ) {
        let samples = rgba.repeat((w * h) as usize);
        let surface = PixelSurface::new(w, h, samples).unwrap();
        let expected = ColorSample::new(rgba[0], rgba[1], rgba[2]);

        let extractors: [Box<dyn PaletteExtractor>; 2] =
            [Box::new(MedianCut::default()), Box::new(KMeans::default())];
        for extractor in extractors {
            let palette = extractor.extract(&surface, count).unwrap();
            prop_assert_eq!(palette.entries()[0].color, expected);
        }
    }

    #[test]
    fn non_image_types_are_rejected(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let err = ImageDecoder::default().decode(&bytes, "text/plain").unwrap_err();
        let is_not_an_image = matches!(err, DecodeError::NotAnImage { .. });
        prop_assert!(is_not_an_image);
    }
}

#[test]
fn zero_pixel_surface_is_an_error_for_every_extractor() {
    let surface = PixelSurface::new(0, 4, Vec::new()).unwrap();
    assert_eq!(
        MedianCut::default().extract(&surface, 5),
        Err(ExtractionError::EmptySurface)
    );
    assert_eq!(
        KMeans::default().extract(&surface, 5),
        Err(ExtractionError::EmptySurface)
    );
}
