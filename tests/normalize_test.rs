//! Integration tests for the normalization pipeline.

use docnorm::normalize::{is_caption_candidate, Normalizer, MIN_RUN};
use docnorm::{
    normalize, normalize_with_options, BoundingBox, Collection, Document, Element, Error, Handle,
    Label, NormalizeOptions, ProvenanceItem,
};

fn place(page: u32, l: f64, t: f64, r: f64, b: f64) -> Vec<ProvenanceItem> {
    vec![ProvenanceItem::new(page, BoundingBox::bottom_left(l, t, r, b))]
}

/// Every non-root element is listed by its parent, and every listed child
/// points back at its owner.
fn assert_referential_integrity(doc: &Document) {
    let owners = std::iter::once(&doc.body).chain(
        Collection::ALL
            .iter()
            .flat_map(|c| doc.collection(*c).iter()),
    );
    for owner in owners {
        for child in &owner.children {
            let element = doc.element(child).expect("dangling child");
            assert_eq!(element.parent.as_ref(), Some(&owner.self_ref));
        }
    }

    for collection in Collection::ALL {
        for element in doc.collection(collection) {
            let parent = element.parent.as_ref().expect("detached element");
            let parent_el = if parent.is_body() {
                &doc.body
            } else {
                doc.element(parent).expect("dangling parent")
            };
            let listed = parent_el
                .children
                .iter()
                .filter(|c| **c == element.self_ref)
                .count();
            assert_eq!(listed, 1, "{} listed {} times", element.self_ref, listed);
        }
    }
}

/// Leaves under `handles`, replacing each group by its members in order.
fn unwrap_groups(doc: &Document, handles: &[Handle]) -> Vec<Handle> {
    let mut leaves = Vec::new();
    for handle in handles {
        let element = doc.element(handle).expect("dangling handle");
        if element.label == Label::Group {
            leaves.extend(unwrap_groups(doc, &element.children));
        } else {
            leaves.push(handle.clone());
        }
    }
    leaves
}

/// How synthetic elements are laid out.
#[derive(Clone, Copy)]
enum Layout {
    /// One tall column on a single page
    SinglePage,
    /// One column per page, starting a new page when the column is full
    Paged,
}

/// Deterministic pseudo-random layouts.
fn synthetic_document(seed: u64, elements: usize, layout: Layout) -> Document {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64
    };

    let page_top = match layout {
        Layout::SinglePage => 200.0 * elements as f64,
        Layout::Paged => 780.0,
    };
    let mut doc = Document::new();
    let mut top = page_top;
    let mut page = 1;
    for _ in 0..elements {
        let kind = next();
        let height = if kind < 0.5 { 60.0 + next() * 120.0 } else { 10.0 + next() * 30.0 };
        if top - height < 40.0 {
            page += 1;
            top = page_top;
        }
        let l = 60.0 + next() * 80.0;
        let r = l + 150.0 + next() * 300.0;
        let prov = place(page, l, top, r, top - height);

        if kind < 0.5 {
            doc.add_element(Collection::Pictures, Label::Picture, prov);
        } else if kind < 0.9 {
            doc.add_element(Collection::Texts, Label::Text, prov);
        } else {
            doc.add_element(Collection::Texts, Label::Caption, prov);
        }

        // small gaps make caption matches likely
        top -= height + next() * 4.0;
    }
    doc
}

/// Number of picture children of each group created after `existing`.
fn new_group_picture_counts(doc: &Document, existing: usize) -> Vec<(Handle, usize)> {
    doc.groups[existing..]
        .iter()
        .map(|group| {
            let pictures = group
                .children
                .iter()
                .filter(|c| doc.element(c).map(Element::is_picture).unwrap_or(false))
                .count();
            (group.self_ref.clone(), pictures)
        })
        .collect()
}

#[test]
fn test_scenario_gallery_with_caption() {
    let mut doc = Document::new();
    let t = doc.add_element(
        Collection::Texts,
        Label::Text,
        place(1, 72.0, 780.0, 540.0, 720.0),
    );
    let p1 = doc.add_element(
        Collection::Pictures,
        Label::Picture,
        place(1, 100.0, 700.0, 500.0, 550.0),
    );
    let p2 = doc.add_element(
        Collection::Pictures,
        Label::Picture,
        place(1, 100.0, 540.0, 500.0, 390.0),
    );
    let p3 = doc.add_element(
        Collection::Pictures,
        Label::Picture,
        place(1, 100.0, 380.0, 500.0, 230.0),
    );
    let c = doc.add_element(
        Collection::Texts,
        Label::Caption,
        place(1, 150.0, 228.0, 450.0, 215.0),
    );
    let before = doc.element_count();

    let report = normalize(&mut doc).unwrap();

    assert_eq!(report.groups_created, 1);
    assert_eq!(doc.groups.len(), 1);
    let group = &doc.groups[0];
    assert_eq!(group.children, vec![p1, p2, p3, c]);
    assert_eq!(doc.body.children, vec![t.clone(), group.self_ref.clone()]);
    assert_eq!(doc.element(&t).unwrap().parent, Some(Handle::body()));
    assert_eq!(doc.element_count(), before + 1);
    assert_referential_integrity(&doc);
}

#[test]
fn test_scenario_isolated_picture() {
    let mut doc = Document::new();
    let p4 = doc.add_element(
        Collection::Pictures,
        Label::Picture,
        place(1, 100.0, 700.0, 500.0, 550.0),
    );
    doc.add_element(
        Collection::Texts,
        Label::Text,
        place(1, 72.0, 300.0, 540.0, 250.0),
    );

    let report = normalize(&mut doc).unwrap();

    assert_eq!(report.groups_created, 0);
    assert_eq!(report.captions_attached, 0);
    assert!(doc.groups.is_empty());
    assert_eq!(doc.element(&p4).unwrap().parent, Some(Handle::body()));
    assert_eq!(doc.body.children[0], p4);
}

#[test]
fn test_scenario_bbox_union() {
    let mut doc = Document::new();
    doc.add_element(
        Collection::Pictures,
        Label::Picture,
        place(1, 0.0, 10.0, 5.0, 0.0),
    );
    doc.add_element(
        Collection::Texts,
        Label::Text,
        place(1, 1.0, 0.0, 4.0, -2.0),
    );

    normalize(&mut doc).unwrap();
    assert_eq!(
        doc.pictures[0].prov[0].bbox,
        BoundingBox::bottom_left(0.0, 10.0, 5.0, -2.0)
    );
}

#[test]
fn test_scenario_rerun_does_not_duplicate_groups() {
    let mut doc = Document::new();
    doc.add_element(
        Collection::Pictures,
        Label::Picture,
        place(1, 100.0, 700.0, 500.0, 550.0),
    );
    doc.add_element(
        Collection::Pictures,
        Label::Picture,
        place(1, 100.0, 540.0, 500.0, 390.0),
    );
    doc.add_element(
        Collection::Texts,
        Label::Text,
        place(1, 150.0, 388.0, 450.0, 375.0),
    );

    let first = normalize(&mut doc).unwrap();
    assert_eq!(first.groups_created, 1);
    assert_eq!(first.captions_attached, 1);
    let after_first = doc.clone();

    let second = normalize(&mut doc).unwrap();
    assert_eq!(second.groups_created, 0);
    assert_eq!(doc.groups.len(), 1);
    assert_eq!(doc.body.children, after_first.body.children);
    assert_referential_integrity(&doc);
}

#[test]
fn test_rerun_with_caption_labels_is_stable() {
    let mut doc = Document::new();
    let picture = doc.add_element(
        Collection::Pictures,
        Label::Picture,
        place(1, 100.0, 700.0, 500.0, 550.0),
    );
    let caption = doc.add_element(
        Collection::Texts,
        Label::Text,
        place(1, 150.0, 548.0, 450.0, 535.0),
    );
    normalize(&mut doc).unwrap();

    // a downstream step relabels the attached text
    doc.texts[0].label = Label::Caption;
    let report = normalize(&mut doc).unwrap();

    assert_eq!(report.captions_released, 1);
    assert_eq!(doc.body.children, vec![picture, caption]);
    // the grown box is kept
    assert_eq!(doc.pictures[0].prov[0].bbox.b, 535.0);
}

#[test]
fn test_referential_integrity_on_synthetic_documents() {
    for seed in 0..20 {
        let mut doc = synthetic_document(seed, 60, Layout::SinglePage);
        normalize(&mut doc).unwrap();
        assert_referential_integrity(&doc);
        assert!(doc.check_integrity().is_ok());

        // and again, on the normalized output
        normalize(&mut doc).unwrap();
        assert_referential_integrity(&doc);
    }
}

#[test]
fn test_minimum_run_property() {
    for seed in 0..20 {
        let mut doc = synthetic_document(seed, 60, Layout::SinglePage);
        let existing = doc.groups.len();
        normalize(&mut doc).unwrap();

        for (group, pictures) in new_group_picture_counts(&doc, existing) {
            assert!(pictures >= MIN_RUN, "{} has {} pictures", group, pictures);
        }
    }
}

#[test]
fn test_minimum_run_property_across_pages() {
    for seed in 0..20 {
        let doc = synthetic_document(seed, 60, Layout::Paged);
        for options in [NormalizeOptions::default(), NormalizeOptions::new().page_ordered()] {
            let mut doc = doc.clone();
            let mut normalizer = Normalizer::new(&mut doc, options).unwrap();
            normalizer.merge_picture_blocks().unwrap();
            drop(normalizer);

            for (group, pictures) in new_group_picture_counts(&doc, 0) {
                assert!(pictures >= MIN_RUN, "{} has {} pictures", group, pictures);
            }
        }
    }
}

#[test]
fn test_candidacy_soundness() {
    for seed in 0..20 {
        let original = synthetic_document(seed, 60, Layout::SinglePage);
        let mut doc = original.clone();
        let options = NormalizeOptions::default();

        let mut normalizer = Normalizer::new(&mut doc, options.clone()).unwrap();
        normalizer.associate_captions().unwrap();
        drop(normalizer);

        for (picture, before) in doc.pictures.iter().zip(&original.pictures) {
            for child in &picture.children {
                let text = doc.element(child).unwrap();
                assert_eq!(text.label, Label::Text);
                assert!(is_caption_candidate(
                    &text.prov[0].bbox,
                    &before.prov[0].bbox,
                    &options.caption
                ));
            }
        }
    }
}

#[test]
fn test_order_unwrap_property() {
    for seed in 0..20 {
        let mut doc = synthetic_document(seed, 40, Layout::SinglePage);
        let original_order = doc.body.children.clone();

        let mut normalizer = Normalizer::new(&mut doc, NormalizeOptions::default()).unwrap();
        normalizer.merge_picture_blocks().unwrap();
        drop(normalizer);

        assert_eq!(unwrap_groups(&doc, &doc.body.children), original_order);
    }
}

#[test]
fn test_order_unwrap_property_with_page_order() {
    for seed in 0..20 {
        let mut doc = synthetic_document(seed, 40, Layout::Paged);
        let original_order = doc.body.children.clone();

        let mut normalizer =
            Normalizer::new(&mut doc, NormalizeOptions::new().page_ordered()).unwrap();
        normalizer.merge_picture_blocks().unwrap();
        drop(normalizer);

        assert_eq!(unwrap_groups(&doc, &doc.body.children), original_order);
    }
}

#[test]
fn test_cross_page_caption_is_fatal() {
    let mut doc = Document::new();
    let picture = doc.add_element(
        Collection::Pictures,
        Label::Picture,
        place(1, 100.0, 300.0, 500.0, 100.0),
    );
    // best match, but on the next page
    doc.add_element(
        Collection::Texts,
        Label::Text,
        place(2, 150.0, 99.9, 450.0, 80.0),
    );
    // weaker match on the picture's own page
    doc.add_element(
        Collection::Texts,
        Label::Text,
        place(1, 150.0, 97.0, 450.0, 80.0),
    );

    let err = normalize(&mut doc).unwrap_err();
    assert!(matches!(
        err,
        Error::CrossPageCaption {
            picture_page: 1,
            caption_page: 2,
            ..
        }
    ));
    assert!(doc.element(&picture).unwrap().children.is_empty());
}

#[test]
fn test_mixed_origin_caption_candidate_is_fatal() {
    let mut doc = Document::new();
    doc.add_element(
        Collection::Pictures,
        Label::Picture,
        place(1, 0.0, 10.0, 5.0, 0.0),
    );
    doc.add_element(
        Collection::Texts,
        Label::Text,
        vec![ProvenanceItem::new(
            1,
            BoundingBox::new(1.0, 0.0, 4.0, -2.0, docnorm::CoordOrigin::TopLeft),
        )],
    );

    let err = normalize(&mut doc).unwrap_err();
    assert!(matches!(err, Error::CoordOriginMismatch { page: 1, .. }));
    assert_eq!(doc.texts[0].parent, Some(Handle::body()));
}

#[test]
fn test_rerun_can_move_attached_text_to_grown_picture() {
    let mut doc = Document::new();
    let p0 = doc.add_element(
        Collection::Pictures,
        Label::Picture,
        place(1, 100.0, 700.0, 500.0, 500.0),
    );
    let p1 = doc.add_element(
        Collection::Pictures,
        Label::Picture,
        place(1, 100.0, 600.0, 500.0, 490.0),
    );
    let x = doc.add_element(
        Collection::Texts,
        Label::Text,
        place(1, 150.0, 498.0, 450.0, 490.0),
    );
    let t = doc.add_element(
        Collection::Texts,
        Label::Text,
        place(1, 150.0, 489.0, 450.0, 480.0),
    );

    let first = normalize(&mut doc).unwrap();
    assert_eq!(first.captions_attached, 2);
    assert_eq!(doc.element(&p0).unwrap().children, vec![x.clone()]);
    assert_eq!(doc.element(&p1).unwrap().children, vec![t.clone()]);

    // p0 now reaches down to 490, so t sits right under it
    let second = normalize(&mut doc).unwrap();
    assert_eq!(second.captions_released, 0);
    assert_eq!(second.groups_created, 0);
    assert_eq!(doc.element(&p0).unwrap().children, vec![x, t.clone()]);
    assert!(doc.element(&p1).unwrap().children.is_empty());
    assert_eq!(doc.element(&t).unwrap().parent, Some(p0));
    assert_referential_integrity(&doc);
}

#[test]
fn test_mixed_origins_are_fatal() {
    let mut doc = Document::new();
    doc.add_element(
        Collection::Pictures,
        Label::Picture,
        vec![
            ProvenanceItem::new(1, BoundingBox::bottom_left(0.0, 10.0, 5.0, 0.0)),
            ProvenanceItem::new(
                1,
                BoundingBox::new(0.0, 0.0, 5.0, 10.0, docnorm::CoordOrigin::TopLeft),
            ),
        ],
    );
    doc.add_element(
        Collection::Texts,
        Label::Text,
        place(1, 1.0, 0.0, 4.0, -2.0),
    );

    let err = normalize(&mut doc).unwrap_err();
    assert!(matches!(err, Error::CoordOriginMismatch { page: 1, .. }));
}

#[test]
fn test_one_sided_edge_rejected() {
    let mut doc = Document::new();
    doc.add_element(
        Collection::Pictures,
        Label::Picture,
        place(1, 0.0, 10.0, 5.0, 0.0),
    );
    let text = doc.add_element(
        Collection::Texts,
        Label::Text,
        place(1, 1.0, 0.0, 4.0, -2.0),
    );
    doc.body.children.retain(|c| *c != text);

    let err = normalize(&mut doc).unwrap_err();
    assert!(matches!(err, Error::MissingBackEdge { .. }));

    // without the upfront check, moving the text trips over it
    let options = NormalizeOptions::new().with_integrity_checks(false);
    let err = normalize_with_options(&mut doc, &options).unwrap_err();
    assert!(matches!(err, Error::MissingBackEdge { .. }));
}
