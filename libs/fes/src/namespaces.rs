//! XML namespaces used by filter documents

/// OGC Filter Encoding 2.0
pub const FES20: &str = "http://www.opengis.net/fes/2.0";

/// OGC Filter Encoding 1.1 (legacy `ogc:` elements such as `FeatureId`)
pub const OGC: &str = "http://www.opengis.net/ogc";

/// GML 3.2
pub const GML32: &str = "http://www.opengis.net/gml/3.2";

/// GML 3.1 / 2.x, still seen in older clients
pub const GML: &str = "http://www.opengis.net/gml";

pub fn is_gml(namespace: Option<&str>) -> bool {
    matches!(namespace, Some(GML32) | Some(GML))
}
