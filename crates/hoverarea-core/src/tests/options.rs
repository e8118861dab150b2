use super::*;

#[test]
fn element_options_override_caller_options() {
    let mut doc = doc(
        r##"<div id="box"><img src="a.png" usemap="#m" width="20" height="10" options='{"positioned_element_class": "from-attr", "wrap_image_element": true}'></div>
<map name="m"><area shape="rect" coords="0,0,5,5" href="#a" class="onhover"></map>"##,
    );
    let options = OverlayOptions::default()
        .with_container("#box")
        .with_positioned_class(PositionedClass::Single("from-caller".to_string()));
    let report = OverlayBuilder::new(options)
        .apply_selector(&mut doc, "img")
        .unwrap();

    let (container, overlays, _) = applied(&report.targets[0].outcome);
    // The wrapper wins over the caller's container once the attribute enables it.
    assert_ne!(container, one(&doc, "#box"));
    assert_eq!(doc.tag_name(container), Some("div"));
    assert_eq!(doc.attr(overlays[0], "class"), Some("from-attr"));
}

#[test]
fn element_options_accept_json5_and_the_class_alias() {
    let mut doc = doc(
        r##"<div id="box"><img src="a.png" usemap="#m" options="{css_class: ['shade', 'label']}"></div>
<map name="m"><area shape="rect" coords="0,0,5,5" href="#a" class="onhover" x-label="Hi"></map>"##,
    );
    let report = OverlayBuilder::new(OverlayOptions::default().with_container("#box"))
        .apply_selector(&mut doc, "img")
        .unwrap();

    let (_, overlays, _) = applied(&report.targets[0].outcome);
    let layers = doc.children(overlays[0]).to_vec();
    assert_eq!(layers.len(), 2);
    assert_eq!(doc.attr(layers[0], "class"), Some("shade"));
    assert_eq!(doc.inner_html(layers[1]), "Hi");
}

#[test]
fn malformed_element_options_fall_back_to_caller_options() {
    for raw in ["{not json", "[1, 2]", "42", r#"{"wrap_image_element": "yes"}"#] {
        let mut doc = doc(&format!(
            r##"<div id="box"><img src="a.png" usemap="#m" options='{raw}'></div><map name="m"><area shape="rect" coords="0,0,5,5" href="#a" class="onhover"></map>"##
        ));
        let options = OverlayOptions::default()
            .with_container("#box")
            .with_positioned_class(PositionedClass::Single("from-caller".to_string()));
        let report = OverlayBuilder::new(options)
            .apply_selector(&mut doc, "img")
            .unwrap();

        let (container, overlays, _) = applied(&report.targets[0].outcome);
        assert_eq!(container, one(&doc, "#box"), "options={raw}");
        assert_eq!(doc.attr(overlays[0], "class"), Some("from-caller"));
    }
}

#[test]
fn element_options_can_clear_the_caller_container() {
    let mut doc = doc(
        r##"<div id="box"><img src="a.png" usemap="#m" options='{"image_element_container": false}'></div><map name="m"><area shape="rect" coords="0,0,5,5" href="#a" class="onhover"></map>"##,
    );
    let report = OverlayBuilder::new(OverlayOptions::default().with_container("#box"))
        .apply_selector(&mut doc, "img")
        .unwrap();
    assert_eq!(skipped(&report.targets[0].outcome), &SkipReason::NoContainer);
    assert!(doc.has_class(one(&doc, "area"), "onhover"));
}

#[test]
fn element_options_can_change_the_marker_class() {
    let mut doc = doc(
        r##"<div id="box"><img src="a.png" usemap="#m" options='{"area_marker_class": "active"}'></div>
<map name="m">
  <area shape="rect" coords="0,0,5,5" href="#a" class="onhover">
  <area shape="rect" coords="5,5,10,10" href="#b" class="active custom1 custom2">
</map>"##,
    );
    let report = OverlayBuilder::new(OverlayOptions::default().with_container("#box"))
        .apply_selector(&mut doc, "img")
        .unwrap();

    let (_, overlays, _) = applied(&report.targets[0].outcome);
    assert_eq!(overlays.len(), 1);
    assert_eq!(doc.attr(overlays[0], "href"), Some("#b"));
    assert_eq!(doc.attr(overlays[0], "class"), Some("custom1 custom2"));
    assert_eq!(doc.select("area.onhover").unwrap().len(), 1);
}

#[test]
fn caller_options_from_json_are_strict() {
    let options = OverlayOptions::from_json_str(
        r##"{image_element_container: "#demo_01", positioned_element_class: "hoverable"}"##,
    )
    .unwrap();
    assert_eq!(
        options.image_element_container,
        Some(ElementRef::Selector("#demo_01".to_string()))
    );
    assert_eq!(
        options.positioned_element_class,
        PositionedClass::Single("hoverable".to_string())
    );

    for bad in ["", "[]", "{wrap_image_element: 3}", "{image_element: 7}"] {
        let err = OverlayOptions::from_json_str(bad).unwrap_err();
        assert!(matches!(err, Error::InvalidOptions { .. }), "{bad}: {err}");
    }
}

#[test]
fn empty_wrapper_counts_as_absent() {
    let options = OverlayOptions::default().with_image_element_wrapper("   ");
    assert_eq!(options.effective_wrapper(), None);

    let options = options.with_wrap_image_element(true);
    assert_eq!(
        options.effective_wrapper(),
        Some(config::DEFAULT_IMAGE_WRAPPER)
    );

    let options = options.with_image_element_wrapper("<figure></figure>");
    assert_eq!(options.effective_wrapper(), Some("<figure></figure>"));
}

#[test]
fn element_options_with_both_class_spellings_still_apply() {
    let mut doc = doc(
        r##"<div id="box"><img src="a.png" usemap="#m" options='{"css_class": "old", "positioned_element_class": "new"}'></div><map name="m"><area shape="rect" coords="0,0,5,5" href="#a" class="onhover"></map>"##,
    );
    let report = OverlayBuilder::new(OverlayOptions::default().with_container("#box"))
        .apply_selector(&mut doc, "img")
        .unwrap();

    let (_, overlays, _) = applied(&report.targets[0].outcome);
    assert_eq!(doc.attr(overlays[0], "class"), Some("new"));
}
