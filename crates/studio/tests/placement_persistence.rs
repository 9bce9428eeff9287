//! Placement sessions persisted through the transform buffer.

mod common;

use std::io::Cursor;
use std::sync::Arc;

use common::{payload, Harness};
use vendora_core::design::FALLBACK_DESIGN_SIZE;
use vendora_core::product::PostValidationAction;
use vendora_core::placement::{
    ContainerSize, Delimitation, ImageSize, NumericEdit, PlacementConfig, PlacementSession,
    PointerInput, ProductView, TransformMap,
};
use vendora_studio::memory::InMemoryTransformStorage;
use vendora_studio::transform_buffer::TransformBuffer;

const PRODUCT_ID: i64 = 42;

fn session() -> PlacementSession {
    let front = ProductView {
        image: ImageSize { width: 1000.0, height: 1000.0 },
        delimitations: vec![Delimitation {
            x: 25.0,
            y: 25.0,
            width: 50.0,
            height: 50.0,
            coordinate_type: None,
        }],
    };
    let back = ProductView {
        image: ImageSize { width: 800.0, height: 1000.0 },
        delimitations: vec![Delimitation {
            x: 200.0,
            y: 250.0,
            width: 400.0,
            height: 400.0,
            coordinate_type: None,
        }],
    };
    PlacementSession::new(
        vec![front, back],
        ImageSize { width: 100.0, height: 50.0 },
        ContainerSize { width: 400.0, height: 400.0 },
        PlacementConfig::default(),
    )
}

fn pending(session: &mut PlacementSession) -> TransformMap {
    session
        .take_changes()
        .into_iter()
        .filter_map(|zone| session.transform(zone).map(|t| (zone, t)))
        .collect()
}

#[tokio::test]
async fn edits_survive_a_new_session() {
    let storage = Arc::new(InMemoryTransformStorage::new());
    let buffer = TransformBuffer::new(storage.clone());

    let mut editing = session();
    editing.select(0);
    editing.numeric_edit(NumericEdit::ScalePercent(50.0));
    assert!(editing.begin_drag(0, PointerInput::mouse(200.0, 200.0)));
    editing.pointer_move(PointerInput::mouse(230.0, 190.0));
    editing.pointer_up();

    buffer.set_many(PRODUCT_ID, pending(&mut editing));
    assert_eq!(buffer.flush().await.unwrap(), 1);
    assert_eq!(storage.save_count(), 1);

    let reloaded_buffer = TransformBuffer::new(storage.clone());
    let mut restored = session();
    restored.load_transforms(&reloaded_buffer.load(PRODUCT_ID).await.unwrap());

    assert_eq!(restored.transform(0), editing.transform(0));
    let t = restored.transform(0).unwrap();
    assert_eq!(t.design_scale, 0.5);
    assert_eq!((t.x, t.y), (30.0, -10.0));
}

#[tokio::test]
async fn reset_persists_defaults() {
    let storage = Arc::new(InMemoryTransformStorage::new());
    let buffer = TransformBuffer::new(storage.clone());

    let mut s = session();
    s.select(0);
    s.numeric_edit(NumericEdit::ScalePercent(95.0));
    buffer.set_many(PRODUCT_ID, pending(&mut s));
    buffer.flush().await.unwrap();

    s.reset();
    buffer.reset(PRODUCT_ID, s.transforms().clone());
    buffer.save_now(PRODUCT_ID).await.unwrap();

    assert_eq!(storage.saved(PRODUCT_ID), Some(s.defaults()));
    assert_eq!(buffer.dirty_count(), 0);
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbaImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn front_only(design: ImageSize) -> PlacementSession {
    let front = ProductView {
        image: ImageSize { width: 1000.0, height: 1000.0 },
        delimitations: vec![Delimitation {
            x: 25.0,
            y: 25.0,
            width: 50.0,
            height: 50.0,
            coordinate_type: None,
        }],
    };
    PlacementSession::new(
        vec![front],
        design,
        ContainerSize { width: 400.0, height: 400.0 },
        PlacementConfig::default(),
    )
}

#[tokio::test]
async fn uploaded_artwork_size_drives_default_placement() {
    let h = Harness::new();
    let (_, design_id) = h
        .create(payload("Banner tee", &png(200, 100), PostValidationAction::ToDraft))
        .await;

    let design = h.catalog.design(design_id).unwrap();
    assert_eq!(design.natural_size, Some(ImageSize { width: 200.0, height: 100.0 }));

    // 200x200 zone: the 2:1 artwork stays within 70% of the width.
    let session = front_only(design.placement_size());
    let (width, height) = session.rendered_size(0).unwrap();
    assert!(width <= 140.0 + 1e-9);
    assert!((width / height - 2.0).abs() < 1e-9);

    let unknown = front_only(FALLBACK_DESIGN_SIZE);
    let (fallback_width, fallback_height) = unknown.rendered_size(0).unwrap();
    assert_eq!(fallback_width, fallback_height);
}
