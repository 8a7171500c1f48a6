use image::{GrayImage, Luma};
use oocontour::{
    extract_cortex, extract_zona, CortexConfig, ExclusionSet, ExclusionZone, SliceScope,
    ZonaConfig,
};
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn render(w: u32, h: u32, inside: impl Fn(f64) -> bool) -> GrayImage {
    let (cx, cy) = (w as f64 / 2.0, h as f64 / 2.0);
    let mut img = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let d = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
            if inside(d) {
                img.put_pixel(x, y, Luma([255]));
            }
        }
    }
    img
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let size: u32 = match args.get(1) {
        Some(s) => s.parse()?,
        None => 200,
    };
    let half = size as f64 / 2.0;

    let cortex_mask = render(size, size, |d| d <= 0.3 * size as f64);
    let zona_mask = render(size, size, |d| d >= 0.36 * size as f64 && d <= 0.44 * size as f64);

    // Distrust the lower-right quadrant of slice 1.
    let zones = ExclusionSet::new(vec![ExclusionZone::new(
        SliceScope::Slice(1),
        vec![[half, half], [2.0 * half, half], [2.0 * half, 2.0 * half], [half, 2.0 * half]],
    )]);

    let cortex = extract_cortex(
        &cortex_mask,
        &cortex_mask,
        None,
        &zones,
        1,
        &CortexConfig::default(),
    )?;
    let zona = extract_zona(&zona_mask, None, &zones, 1, &ZonaConfig::default())?;

    println!(
        "{}: {} vertices, {} patched, area {:.1}",
        cortex.contour.name,
        cortex.contour.len(),
        cortex.metrics.n_patched,
        cortex.contour.area()
    );
    for c in zona.inner.iter().chain(zona.outer.iter()) {
        println!("{}: {} vertices, area {:.1}", c.name, c.len(), c.area());
    }

    if let Some(out_path) = args.get(2) {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "cortex": cortex,
            "zona": zona,
        }))?;
        std::fs::write(out_path, json)?;
        println!("Wrote {out_path}");
    }
    Ok(())
}
