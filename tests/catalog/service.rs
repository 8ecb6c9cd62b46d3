use catalog_sync::catalog::{
    filter_projects, CatalogError, Product, ProductPatch, Project, ProjectPatch, ProjectStatus,
    ValidationError,
};
use catalog_sync::storage::ObjectStore;

use crate::support::{new_product, new_project, Fixture, PUBLIC_BASE};

#[test]
fn project_with_empty_gallery_is_rejected_before_allocator_and_store() {
    let fx = Fixture::new();

    let err = fx
        .catalog
        .create::<Project>(new_project("Bridge", &[]))
        .unwrap_err();

    assert!(matches!(err, CatalogError::Validation(ValidationError::EmptyGallery)));
    assert_eq!(err.status_code(), 400);
    assert_eq!(fx.allocator.calls(), 0);
    assert_eq!(fx.connects(), 0);
    assert_eq!(fx.store.count("projects").unwrap(), 0);
}

#[test]
fn product_without_title_is_rejected_before_allocator() {
    let fx = Fixture::new();
    let mut input = new_product("x");
    input.title = Some("   ".into());

    assert!(fx.catalog.create::<Product>(input).is_err());
    assert_eq!(fx.allocator.calls(), 0);
}

#[test]
fn products_and_projects_use_separate_sequences() {
    let fx = Fixture::new();

    let a: Product = fx.catalog.create(new_product("Rover")).unwrap();
    let b: Product = fx.catalog.create(new_product("Arm")).unwrap();
    let p: Project = fx
        .catalog
        .create(new_project("Line", &["https://cdn.example.com/p/1.png"]))
        .unwrap();

    assert_eq!((a.numeric_id, b.numeric_id, p.numeric_id), (1, 2, 1));
    assert_eq!(fx.connects(), 1);
    assert_eq!(fx.allocator.calls(), 3);
}

#[test]
fn project_defaults_are_filled_on_create() {
    let fx = Fixture::new();
    let p: Project = fx
        .catalog
        .create(new_project("Line", &["https://cdn.example.com/p/1.png"]))
        .unwrap();

    assert_eq!(p.status, ProjectStatus::Delivered);
    assert!(p.tags.is_empty());
    assert!(p.specs.is_empty());
    assert_eq!(p.overview, "");
    assert_eq!(p.created_at, p.updated_at);
}

#[test]
fn partial_update_only_touches_present_fields() {
    let fx = Fixture::new();
    let created: Project = fx
        .catalog
        .create(new_project("Line", &["https://cdn.example.com/p/1.png"]))
        .unwrap();

    let updated: Project = fx
        .catalog
        .update(
            created.numeric_id,
            ProjectPatch {
                status: Some(ProjectStatus::InProgress),
                year: Some(2024),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.title, "Line");
    assert_eq!(updated.gallery, created.gallery);
    assert_eq!(updated.status, ProjectStatus::InProgress);
    assert_eq!(updated.year, Some(2024));
    assert!(updated.updated_at >= created.updated_at);

    let err = fx
        .catalog
        .update::<Project>(
            created.numeric_id,
            ProjectPatch {
                gallery: Some(vec![]),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[test]
fn uploaded_images_are_deleted_with_their_product() {
    let fx = Fixture::new();

    let upload = fx
        .catalog
        .presign_upload(Some("products"), "front view.jpg", "image/jpeg")
        .unwrap();
    assert!(upload.public_url.starts_with(PUBLIC_BASE));
    fx.objects
        .upload(&upload.upload_url, "image/jpeg", vec![1, 2, 3])
        .unwrap();
    assert!(fx.objects.contains(&upload.key));

    let mut input = new_product("Rover");
    input.gallery = Some(vec![upload.public_url.clone()]);
    let product: Product = fx.catalog.create(input).unwrap();
    assert_eq!(product.gallery[0], upload.public_url);
    assert_eq!(fx.objects.key_from_url(&upload.public_url), Some(upload.key.clone()));

    let report = fx.catalog.delete::<Product>(product.numeric_id).unwrap();
    assert_eq!(report.removed_images, 1);
    assert!(report.failed_images.is_empty());
    assert!(!fx.objects.contains(&upload.key));
    assert!(fx.catalog.get::<Product>(product.numeric_id).is_err());
}

#[test]
fn image_cleanup_failure_does_not_block_delete() {
    let fx = Fixture::new();
    fx.objects.put("products/a.png", "image/png", vec![]).unwrap();
    fx.objects.fail_deletes_of("products/a.png");

    let mut input = new_product("Rover");
    input.gallery = Some(vec![format!("{}/products/a.png", PUBLIC_BASE)]);
    let product: Product = fx.catalog.create(input).unwrap();

    let report = fx.catalog.delete::<Product>(product.numeric_id).unwrap();
    assert_eq!(report.failed_images, vec!["products/a.png".to_string()]);
    assert!(fx.catalog.list::<Product>().unwrap().is_empty());
}

#[test]
fn update_rename_is_visible_in_listing() {
    let fx = Fixture::new();
    fx.catalog.create::<Product>(new_product("a")).unwrap();
    fx.catalog.create::<Product>(new_product("b")).unwrap();

    fx.catalog
        .update::<Product>(
            1,
            ProductPatch {
                title: Some("renamed".into()),
                ..Default::default()
            },
        )
        .unwrap();

    let titles: Vec<String> = fx
        .catalog
        .list::<Product>()
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, vec!["b".to_string(), "renamed".to_string()]);
}

#[test]
fn search_and_status_filter() {
    let fx = Fixture::new();
    let gallery = ["https://cdn.example.com/g.png"];
    fx.catalog.create::<Project>(new_project("Solar Tracker", &gallery)).unwrap();
    let mut proto = new_project("Drone Frame", &gallery);
    proto.status = Some(ProjectStatus::Prototype);
    proto.tags = Some(vec!["carbon".into()]);
    fx.catalog.create::<Project>(proto).unwrap();

    let found = fx.catalog.search::<Project>("SOLAR").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Solar Tracker");

    let all = fx.catalog.list::<Project>().unwrap();
    let by_tag = filter_projects(&all, "carbon", None);
    assert_eq!(by_tag.len(), 1);
    let protos = filter_projects(&all, "", Some(ProjectStatus::Prototype));
    assert_eq!(protos[0].title, "Drone Frame");
}
