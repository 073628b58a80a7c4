//! This bench measures the voxel kernels of a merge: building the mask of a
//! region with many descendants and overlaying an override through it.

#![allow(missing_docs)]

use std::collections::BTreeSet;

use atlas_merge::{
    RegionHierarchy, VolumeData,
    compositor::{overlay, region_mask},
};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use ndarray::Array3;

const SHAPE: (usize, usize, usize) = (128, 96, 96);

/// A root with 64 children, each with 8 leaves.
fn hierarchy() -> RegionHierarchy {
    let mut links = vec![(1, None)];
    for child in 0..64 {
        let child_id = 100 + child;
        links.push((child_id, Some(1)));
        for leaf in 0..8 {
            links.push((10_000 + child_id * 10 + leaf, Some(child_id)));
        }
    }
    RegionHierarchy::from_parent_links(links).unwrap()
}

fn labels(hierarchy: &RegionHierarchy) -> Array3<u32> {
    let ids: Vec<u32> = hierarchy.iter().map(|region| region.id()).collect();
    let mut index = 0;
    Array3::from_shape_simple_fn(SHAPE, || {
        index = (index + 7) % ids.len();
        ids[index]
    })
}

fn composite(c: &mut Criterion) {
    let hierarchy = hierarchy();
    let labels = labels(&hierarchy);
    let ids: BTreeSet<u32> = hierarchy
        .descendants_of(100)
        .union(&hierarchy.descendants_of(140))
        .copied()
        .collect();

    c.bench_function("region mask", |b| {
        b.iter(|| region_mask(&labels, &ids));
    });

    let mask = region_mask(&labels, &ids);
    let source = VolumeData::from(Array3::<f32>::ones(SHAPE));
    c.bench_function("overlay", |b| {
        b.iter_batched(
            || VolumeData::from(Array3::<f32>::zeros(SHAPE)),
            |mut target| {
                overlay(&mut target, &source, &mask).unwrap();
                target
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, composite);
criterion_main!(benches);
