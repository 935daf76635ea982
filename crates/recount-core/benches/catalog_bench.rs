//! Criterion benchmarks for recount-core.
//!
//! ## Benchmark groups
//!
//! 1. **build** — Parsing and flattening both source documents.
//! 2. **annotation_lookup** — Composite-key lookups and field projection.
//! 3. **split_lookup** — Split membership and reverse `split_of` lookups.
//!
//! ## Running
//!
//! ```sh
//! cargo bench --manifest-path crates/recount-core/Cargo.toml
//! # Run only the split lookup group:
//! cargo bench --manifest-path crates/recount-core/Cargo.toml -- split_lookup
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Map, Value};

use _recount_core::{AnnotationIndex, DatasetCatalog, SplitIndex};

const CAPTIONS_PER_IMAGE: usize = 3;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn caption(image: usize, slot: usize) -> String {
    format!("the {slot} objects in image {image}")
}

/// Annotation document with `n_images` images of `CAPTIONS_PER_IMAGE`
/// captions each.
fn annotation_doc(n_images: usize) -> String {
    let mut images = Map::new();
    for image in 0..n_images {
        let mut captions = Map::new();
        for slot in 0..CAPTIONS_PER_IMAGE {
            captions.insert(
                caption(image, slot),
                json!({"class": "cup", "attribute": format!("attr{slot}"), "type": "color"}),
            );
        }
        images.insert(format!("img{image}"), Value::Object(captions));
    }
    Value::Object(images).to_string()
}

/// Split document assigning pairs round-robin to train/val/test.
fn split_doc(n_images: usize) -> String {
    let mut train = Vec::new();
    let mut val = Vec::new();
    let mut test = Vec::new();
    for image in 0..n_images {
        for slot in 0..CAPTIONS_PER_IMAGE {
            let entry = json!([format!("img{image}"), caption(image, slot)]);
            match (image + slot) % 5 {
                0 => val.push(entry),
                1 => test.push(entry),
                _ => train.push(entry),
            }
        }
    }
    json!({"train": train, "val": val, "test": test}).to_string()
}

// ---------------------------------------------------------------------------
// 1. build
// ---------------------------------------------------------------------------

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for &n_images in &[100, 1_000, 8_000] {
        let annotations = annotation_doc(n_images);
        let splits = split_doc(n_images);

        group.bench_with_input(
            BenchmarkId::new("annotation_index", n_images),
            &annotations,
            |b, text| b.iter(|| AnnotationIndex::from_json_str(black_box(text)).unwrap()),
        );
        group.bench_with_input(
            BenchmarkId::new("split_index", n_images),
            &splits,
            |b, text| b.iter(|| SplitIndex::from_json_str(black_box(text)).unwrap()),
        );
        group.bench_with_input(
            BenchmarkId::new("catalog", n_images),
            &(annotations, splits),
            |b, (annotations, splits)| {
                b.iter(|| {
                    DatasetCatalog::from_documents(
                        black_box(annotations),
                        black_box(splits),
                        "/data/rec-8k",
                    )
                    .unwrap()
                })
            },
        );
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// 2. annotation_lookup
// ---------------------------------------------------------------------------

fn bench_annotation_lookup(c: &mut Criterion) {
    let n_images = 8_000;
    let catalog =
        DatasetCatalog::from_documents(&annotation_doc(n_images), &split_doc(n_images), "/data")
            .unwrap();
    let image_id = format!("img{}", n_images / 2);
    let hit = caption(n_images / 2, 1);
    let mut group = c.benchmark_group("annotation_lookup");

    group.bench_function("get_hit", |b| {
        b.iter(|| catalog.annotation(black_box(&image_id), black_box(&hit)).unwrap())
    });
    group.bench_function("class_name_hit", |b| {
        b.iter(|| catalog.class_name(black_box(&image_id), black_box(&hit)).unwrap())
    });
    group.bench_function("get_miss", |b| {
        b.iter(|| catalog.annotation(black_box(&image_id), black_box("no such caption")).is_err())
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// 3. split_lookup
// ---------------------------------------------------------------------------

fn bench_split_lookup(c: &mut Criterion) {
    let n_images = 8_000;
    let catalog =
        DatasetCatalog::from_documents(&annotation_doc(n_images), &split_doc(n_images), "/data")
            .unwrap();
    let last_image = format!("img{}", n_images - 1);
    let last_caption = caption(n_images - 1, CAPTIONS_PER_IMAGE - 1);
    let mut group = c.benchmark_group("split_lookup");

    group.bench_function("members_train", |b| {
        b.iter(|| catalog.members_of_split(black_box("train")).unwrap().len())
    });
    group.bench_function("split_of_last_pair", |b| {
        b.iter(|| catalog.split_of(black_box(&last_image), black_box(&last_caption)))
    });
    group.bench_function("split_of_unassigned", |b| {
        b.iter(|| catalog.split_of(black_box("img-none"), black_box("nothing")))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_annotation_lookup,
    bench_split_lookup
);
criterion_main!(benches);
