// Copyright 2025 the KTMath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Broad + narrow phase rectangle picking: `Grid2D` + kurbo geometry.
//!
//! Scatters rectangles and circles over a 1000x1000 world, indexes them in a
//! grid sized from the item count, then picks everything exactly under a
//! selection rectangle and compares against a linear scan.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p ktmath_demos --example broad_phase`

use kurbo::{Circle, Rect};
use ktmath::{Aabb2D, Grid2D, Resolution};
use ktmath_demos::{RectPick, Shape};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn scene() -> Vec<Shape> {
    // Fixed seed so runs are comparable.
    let mut rng = StdRng::seed_from_u64(7);

    (0..2_000)
        .map(|i| {
            let x = rng.random_range(0.0..1000.0);
            let y = rng.random_range(0.0..1000.0);
            if i % 2 == 0 {
                let w = rng.random_range(0.0..50.0);
                let h = rng.random_range(0.0..50.0);
                Shape::Rect(Rect::new(x, y, x + w, y + h))
            } else {
                Shape::Circle(Circle::new((x, y), rng.random_range(0.0..25.0)))
            }
        })
        .collect()
}

fn main() {
    env_logger::init();

    let shapes = scene();
    let world = Aabb2D::new(0.0, 0.0, 1000.0, 1000.0);
    let res = Resolution::for_item_count(shapes.len(), 4);

    let mut grid = Grid2D::new();
    grid.reset(world, res.x, res.y);
    for s in &shapes {
        grid.add_geometry(s);
    }
    println!(
        "indexed {} shapes in {}x{} cells ({} occupied)",
        grid.len(),
        res.x,
        res.y,
        grid.occupied_cells()
    );

    let selection = Rect::new(200.0, 200.0, 320.0, 260.0);
    log::info!("picking shapes under {selection:?}");
    let mut pick = RectPick::new(selection, usize::MAX);
    grid.process_candidates(&mut pick);

    let scanned = shapes
        .iter()
        .filter(|s| s.intersects_rect(selection))
        .count();
    println!(
        "selection {selection:?}: {} candidates, {} exact hits (linear scan: {scanned})",
        pick.candidates,
        pick.hits.len()
    );

    // Any-hit query: stop at the first exact hit.
    let mut probe = RectPick::new(Rect::new(500.0, 500.0, 505.0, 505.0), 1);
    grid.process_candidates(&mut probe);
    match probe.hits.first() {
        Some(hit) => println!("probe hit {hit:?} after {} candidates", probe.candidates),
        None => println!("probe hit nothing ({} candidates)", probe.candidates),
    }
}
