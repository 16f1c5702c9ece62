//! Derivation of view names and URL templates
//!
//! Pure functions of the endpoint kind, the resource's envelope and, for
//! relationship endpoints, the sub-resource's envelope. View names are the
//! stable identifiers used for reverse routing.

use crate::core::error::ConfigError;
use crate::core::serializer::Envelope;
use serde::Serialize;

/// Path parameter holding the resource id
pub const ID_PARAM: &str = "id";

/// Path parameter holding the sub-resource id
pub const SUB_ID_PARAM: &str = "sub_id";

/// The four generic endpoint shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    /// `/{xs}`: list, create, replace
    Collection,
    /// `/{xs}/{id}`: get, soft-delete
    ById,
    /// `/{xs}/{id}/{ys}`: get or replace a relationship
    RelationshipCollection,
    /// `/{xs}/{id}/{ys}/{sub_id}`: get or remove one relationship member
    RelationshipMember,
}

impl EndpointKind {
    pub const ALL: [EndpointKind; 4] = [
        EndpointKind::Collection,
        EndpointKind::ById,
        EndpointKind::RelationshipCollection,
        EndpointKind::RelationshipMember,
    ];

    /// Fixed view-name suffix of this kind
    pub fn suffix(&self) -> &'static str {
        match self {
            EndpointKind::Collection => "",
            EndpointKind::ById => "ById",
            EndpointKind::RelationshipCollection => "ByModelId",
            EndpointKind::RelationshipMember => "ByModelIdBySubResourceId",
        }
    }

    pub fn requires_relationship(&self) -> bool {
        matches!(
            self,
            EndpointKind::RelationshipCollection | EndpointKind::RelationshipMember
        )
    }

    /// HTTP methods served by this kind
    pub fn methods(&self) -> &'static [&'static str] {
        match self {
            EndpointKind::Collection => &["GET", "POST", "PUT"],
            EndpointKind::ById => &["GET", "DELETE"],
            EndpointKind::RelationshipCollection => &["GET", "PUT"],
            EndpointKind::RelationshipMember => &["GET", "DELETE"],
        }
    }
}

fn missing_relationship(kind: EndpointKind, resource: Envelope) -> ConfigError {
    ConfigError::MissingRelationship {
        endpoint: format!("{:?}", kind),
        resource: resource.plural.to_string(),
    }
}

/// `{plural}` + `{sub plural}` (when a relationship is given) + kind suffix
///
/// ```
/// use restbase::core::serializer::Envelope;
/// use restbase::resources::deriver::{EndpointKind, view_name};
///
/// let parent = Envelope::new("parent", "parents");
/// let child = Envelope::new("child", "children");
/// assert_eq!(view_name(EndpointKind::ById, parent, None).unwrap(), "parentsById");
/// assert_eq!(
///     view_name(EndpointKind::RelationshipMember, parent, Some(child)).unwrap(),
///     "parentschildrenByModelIdBySubResourceId"
/// );
/// ```
pub fn view_name(
    kind: EndpointKind,
    resource: Envelope,
    relation: Option<Envelope>,
) -> Result<String, ConfigError> {
    if kind.requires_relationship() && relation.is_none() {
        return Err(missing_relationship(kind, resource));
    }
    let mut name = resource.plural.to_string();
    if let Some(sub) = relation {
        name.push_str(sub.plural);
    }
    name.push_str(kind.suffix());
    Ok(name)
}

/// URL template in axum's `{param}` syntax
///
/// ```
/// use restbase::core::serializer::Envelope;
/// use restbase::resources::deriver::{EndpointKind, view_uri};
///
/// let parent = Envelope::new("parent", "parents");
/// let child = Envelope::new("child", "children");
/// assert_eq!(view_uri(EndpointKind::Collection, parent, None).unwrap(), "/parents");
/// assert_eq!(
///     view_uri(EndpointKind::RelationshipCollection, parent, Some(child)).unwrap(),
///     "/parents/{id}/children"
/// );
/// ```
pub fn view_uri(
    kind: EndpointKind,
    resource: Envelope,
    relation: Option<Envelope>,
) -> Result<String, ConfigError> {
    let base = format!("/{}", resource.plural);
    let sub = || relation.ok_or_else(|| missing_relationship(kind, resource));

    Ok(match kind {
        EndpointKind::Collection => base,
        EndpointKind::ById => format!("{}/{{{}}}", base, ID_PARAM),
        EndpointKind::RelationshipCollection => {
            format!("{}/{{{}}}/{}", base, ID_PARAM, sub()?.plural)
        }
        EndpointKind::RelationshipMember => format!(
            "{}/{{{}}}/{}/{{{}}}",
            base,
            ID_PARAM,
            sub()?.plural,
            SUB_ID_PARAM
        ),
    })
}
