/// Tests for textures and their native halves

use super::*;

#[test]
fn test_empty_texture_has_no_source() {
    let tex = Texture::new(TexFormat::Rgba);
    assert!(!tex.has_source());
    assert!(!tex.loaded());
    assert!(tex.bounds().is_empty());
}

#[test]
fn test_with_source_sets_bounds() {
    let tex = Texture::with_source(TexFormat::Rgba, ImageData::new(4, 2, vec![0u8; 32]));
    assert!(tex.has_source());
    assert_eq!(tex.bounds(), Rect::new(0, 0, 4, 2));
}

#[test]
fn test_take_source_empties_the_slot() {
    let tex = Texture::with_source(TexFormat::Rgb, ImageData::new(1, 1, vec![0u8; 4]));
    assert!(tex.take_source().is_some());
    assert!(!tex.has_source());
    assert!(tex.take_source().is_none());
}

#[test]
fn test_set_native_marks_loaded() {
    let resources = Arc::new(ResourceManager::new());
    let tex = Texture::new(TexFormat::Rgba);
    tex.set_native(Arc::new(NativeTexture::new(9, resources)));
    assert!(tex.loaded());
    assert_eq!(tex.native().unwrap().id, 9);
}

#[test]
fn test_dropping_native_texture_enqueues_id() {
    let resources = Arc::new(ResourceManager::new());
    let native = Arc::new(NativeTexture::new(9, resources.clone()));
    assert_eq!(resources.pending_textures(), 0);

    drop(native);
    assert_eq!(resources.pending_textures(), 1);
}
