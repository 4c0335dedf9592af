//! Name tables and predicates for elements from the SVG and MathML namespaces
//!
//! <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign>

use crate::{dom::ElementData, infra::Namespace, tokenization::TagData};

/// <https://html.spec.whatwg.org/multipage/parsing.html#adjust-svg-attributes>
const SVG_ATTRIBUTES: &[(&str, &str)] = &[
    ("attributename", "attributeName"),
    ("attributetype", "attributeType"),
    ("basefrequency", "baseFrequency"),
    ("baseprofile", "baseProfile"),
    ("calcmode", "calcMode"),
    ("clippathunits", "clipPathUnits"),
    ("contentscripttype", "contentScriptType"),
    ("contentstyletype", "contentStyleType"),
    ("diffuseconstant", "diffuseConstant"),
    ("edgemode", "edgeMode"),
    ("externalresourcesrequired", "externalResourcesRequired"),
    ("filterres", "filterRes"),
    ("filterunits", "filterUnits"),
    ("glyphref", "glyphRef"),
    ("gradienttransform", "gradientTransform"),
    ("gradientunits", "gradientUnits"),
    ("kernelmatrix", "kernelMatrix"),
    ("kernelunitlength", "kernelUnitLength"),
    ("keypoints", "keyPoints"),
    ("keysplines", "keySplines"),
    ("keytimes", "keyTimes"),
    ("lengthadjust", "lengthAdjust"),
    ("limitingconeangle", "limitingConeAngle"),
    ("markerheight", "markerHeight"),
    ("markerunits", "markerUnits"),
    ("markerwidth", "markerWidth"),
    ("maskcontentunits", "maskContentUnits"),
    ("maskunits", "maskUnits"),
    ("numoctaves", "numOctaves"),
    ("pathlength", "pathLength"),
    ("patterncontentunits", "patternContentUnits"),
    ("patterntransform", "patternTransform"),
    ("patternunits", "patternUnits"),
    ("pointsatx", "pointsAtX"),
    ("pointsaty", "pointsAtY"),
    ("pointsatz", "pointsAtZ"),
    ("preservealpha", "preserveAlpha"),
    ("preserveaspectratio", "preserveAspectRatio"),
    ("primitiveunits", "primitiveUnits"),
    ("refx", "refX"),
    ("refy", "refY"),
    ("repeatcount", "repeatCount"),
    ("repeatdur", "repeatDur"),
    ("requiredextensions", "requiredExtensions"),
    ("requiredfeatures", "requiredFeatures"),
    ("specularconstant", "specularConstant"),
    ("specularexponent", "specularExponent"),
    ("spreadmethod", "spreadMethod"),
    ("startoffset", "startOffset"),
    ("stddeviation", "stdDeviation"),
    ("stitchtiles", "stitchTiles"),
    ("surfacescale", "surfaceScale"),
    ("systemlanguage", "systemLanguage"),
    ("tablevalues", "tableValues"),
    ("targetx", "targetX"),
    ("targety", "targetY"),
    ("textlength", "textLength"),
    ("viewbox", "viewBox"),
    ("viewtarget", "viewTarget"),
    ("xchannelselector", "xChannelSelector"),
    ("ychannelselector", "yChannelSelector"),
    ("zoomandpan", "zoomAndPan"),
];

/// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign>
const SVG_TAG_NAMES: &[(&str, &str)] = &[
    ("altglyph", "altGlyph"),
    ("altglyphdef", "altGlyphDef"),
    ("altglyphitem", "altGlyphItem"),
    ("animatecolor", "animateColor"),
    ("animatemotion", "animateMotion"),
    ("animatetransform", "animateTransform"),
    ("clippath", "clipPath"),
    ("feblend", "feBlend"),
    ("fecolormatrix", "feColorMatrix"),
    ("fecomponenttransfer", "feComponentTransfer"),
    ("fecomposite", "feComposite"),
    ("feconvolvematrix", "feConvolveMatrix"),
    ("fediffuselighting", "feDiffuseLighting"),
    ("fedisplacementmap", "feDisplacementMap"),
    ("fedistantlight", "feDistantLight"),
    ("feflood", "feFlood"),
    ("fefunca", "feFuncA"),
    ("fefuncb", "feFuncB"),
    ("fefuncg", "feFuncG"),
    ("fefuncr", "feFuncR"),
    ("fegaussianblur", "feGaussianBlur"),
    ("feimage", "feImage"),
    ("femerge", "feMerge"),
    ("femergenode", "feMergeNode"),
    ("femorphology", "feMorphology"),
    ("feoffset", "feOffset"),
    ("fepointlight", "fePointLight"),
    ("fespecularlighting", "feSpecularLighting"),
    ("fespotlight", "feSpotLight"),
    ("fetile", "feTile"),
    ("feturbulence", "feTurbulence"),
    ("foreignobject", "foreignObject"),
    ("glyphref", "glyphRef"),
    ("lineargradient", "linearGradient"),
    ("radialgradient", "radialGradient"),
    ("textpath", "textPath"),
];

/// <https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes>
///
/// Maps an attribute name to its prefix, local name and namespace.
const FOREIGN_ATTRIBUTES: &[(&str, Option<&str>, &str, Namespace)] = &[
    ("xlink:actuate", Some("xlink"), "actuate", Namespace::XLink),
    ("xlink:arcrole", Some("xlink"), "arcrole", Namespace::XLink),
    ("xlink:href", Some("xlink"), "href", Namespace::XLink),
    ("xlink:role", Some("xlink"), "role", Namespace::XLink),
    ("xlink:show", Some("xlink"), "show", Namespace::XLink),
    ("xlink:title", Some("xlink"), "title", Namespace::XLink),
    ("xlink:type", Some("xlink"), "type", Namespace::XLink),
    ("xml:base", Some("xml"), "base", Namespace::XML),
    ("xml:lang", Some("xml"), "lang", Namespace::XML),
    ("xml:space", Some("xml"), "space", Namespace::XML),
    ("xmlns", None, "xmlns", Namespace::XMLNS),
    ("xmlns:xlink", Some("xmlns"), "xlink", Namespace::XMLNS),
];

fn rename_attributes(tag: &mut TagData, table: &[(&str, &str)]) {
    for attribute in &mut tag.attributes {
        if let Some((_, adjusted)) = table
            .iter()
            .find(|(lowercase, _)| *lowercase == attribute.name)
        {
            attribute.name = (*adjusted).to_string();
        }
    }
}

/// <https://html.spec.whatwg.org/multipage/parsing.html#adjust-mathml-attributes>
pub fn adjust_mathml_attributes(tag: &mut TagData) {
    rename_attributes(tag, &[("definitionurl", "definitionURL")]);
}

/// <https://html.spec.whatwg.org/multipage/parsing.html#adjust-svg-attributes>
pub fn adjust_svg_attributes(tag: &mut TagData) {
    rename_attributes(tag, SVG_ATTRIBUTES);
}

/// Restores the camel case of SVG element names, which the tokenizer lowercased
pub fn adjust_svg_tag_name(tag: &mut TagData) {
    if let Some((_, adjusted)) = SVG_TAG_NAMES
        .iter()
        .find(|(lowercase, _)| *lowercase == tag.name)
    {
        tag.name = (*adjusted).to_string();
    }
}

/// <https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes>
pub fn adjust_foreign_attributes(tag: &mut TagData) {
    for attribute in &mut tag.attributes {
        if attribute.namespace.is_some() {
            continue;
        }

        if let Some(&(_, prefix, local_name, namespace)) = FOREIGN_ATTRIBUTES
            .iter()
            .find(|(qualified_name, ..)| *qualified_name == attribute.name)
        {
            attribute.prefix = prefix.map(str::to_string);
            attribute.name = local_name.to_string();
            attribute.namespace = Some(namespace);
        }
    }
}

/// <https://html.spec.whatwg.org/multipage/parsing.html#html-integration-point>
#[must_use]
pub fn is_html_integration_point(element: &ElementData) -> bool {
    match element.namespace {
        Namespace::MathML if element.name == "annotation-xml" => {
            element.attribute("encoding").is_some_and(|encoding| {
                encoding.eq_ignore_ascii_case("text/html")
                    || encoding.eq_ignore_ascii_case("application/xhtml+xml")
            })
        },
        Namespace::SVG => matches!(element.name.as_str(), "foreignObject" | "desc" | "title"),
        _ => false,
    }
}

/// <https://html.spec.whatwg.org/multipage/parsing.html#mathml-text-integration-point>
#[must_use]
pub fn is_mathml_text_integration_point(element: &ElementData) -> bool {
    element.namespace == Namespace::MathML
        && matches!(element.name.as_str(), "mi" | "mo" | "mn" | "ms" | "mtext")
}

/// Whether a start tag inside foreign content closes the foreign elements
/// and is processed as html instead
#[must_use]
pub fn breaks_out_of_foreign_content(tag: &TagData) -> bool {
    let is_breakout_element = matches!(
        tag.name.as_str(),
        "b" | "big"
            | "blockquote"
            | "body"
            | "br"
            | "center"
            | "code"
            | "dd"
            | "div"
            | "dl"
            | "dt"
            | "em"
            | "embed"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "head"
            | "hr"
            | "i"
            | "img"
            | "li"
            | "listing"
            | "menu"
            | "meta"
            | "nobr"
            | "ol"
            | "p"
            | "pre"
            | "ruby"
            | "s"
            | "small"
            | "span"
            | "strong"
            | "strike"
            | "sub"
            | "sup"
            | "table"
            | "tt"
            | "u"
            | "ul"
            | "var"
    );

    let is_presentational_font = tag.name == "font"
        && tag
            .attributes
            .iter()
            .any(|attribute| matches!(attribute.name.as_str(), "color" | "face" | "size"));

    is_breakout_element || is_presentational_font
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Attribute;

    #[test]
    fn svg_adjustments() {
        let mut tag = TagData::new("foreignobject").with_attributes(&[("viewbox", "0 0 1 1")]);
        adjust_svg_tag_name(&mut tag);
        adjust_svg_attributes(&mut tag);

        assert_eq!(tag.name, "foreignObject");
        assert_eq!(tag.lookup_attribute("viewBox"), Some("0 0 1 1"));
    }

    #[test]
    fn foreign_attributes() {
        let mut tag = TagData::new("use").with_attributes(&[
            ("xlink:href", "#a"),
            ("xmlns", "http://www.w3.org/2000/svg"),
            ("class", "x"),
        ]);
        adjust_foreign_attributes(&mut tag);

        let href = &tag.attributes[0];
        assert_eq!(href.prefix.as_deref(), Some("xlink"));
        assert_eq!(href.name, "href");
        assert_eq!(href.namespace, Some(Namespace::XLink));

        assert_eq!(tag.attributes[1].prefix, None);
        assert_eq!(tag.attributes[1].namespace, Some(Namespace::XMLNS));
        assert_eq!(tag.attributes[2].namespace, None);
    }

    #[test]
    fn integration_points() {
        let annotation = ElementData::new(
            "annotation-xml",
            Namespace::MathML,
            vec![Attribute::new("encoding", "Text/HTML")],
        );
        assert!(is_html_integration_point(&annotation));

        let plain_annotation = ElementData::new("annotation-xml", Namespace::MathML, vec![]);
        assert!(!is_html_integration_point(&plain_annotation));

        let desc = ElementData::new("desc", Namespace::SVG, vec![]);
        assert!(is_html_integration_point(&desc));

        let mi = ElementData::new("mi", Namespace::MathML, vec![]);
        assert!(is_mathml_text_integration_point(&mi));
        assert!(!is_html_integration_point(&mi));
    }

    #[test]
    fn breakout() {
        assert!(breaks_out_of_foreign_content(&TagData::new("p")));
        assert!(!breaks_out_of_foreign_content(&TagData::new("font")));
        assert!(breaks_out_of_foreign_content(
            &TagData::new("font").with_attributes(&[("color", "red")])
        ));
        assert!(!breaks_out_of_foreign_content(&TagData::new("circle")));
    }
}
