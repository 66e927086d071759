/// Kind of a per-item required field (spec §4.4's "URL-typed" vs plain
/// string distinction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    PlainString,
    Url,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn s(name: &'static str) -> Field {
    Field { name, kind: FieldKind::PlainString }
}

const fn u(name: &'static str) -> Field {
    Field { name, kind: FieldKind::Url }
}

/// How a schema's nested collection of items is shaped.
#[derive(Debug, Clone, Copy)]
pub enum ArrayShape {
    /// The named top-level key holds a JSON array of items.
    Array(&'static str),
    /// The named top-level key holds a JSON object whose values are each an
    /// array of items (e.g. `/api/v1/jadwal-rilis`'s day-keyed map).
    ObjectOfArrays(&'static str),
}

/// One endpoint's validation contract (spec §4.4's closed table).
pub struct EndpointSchema {
    /// Top-level keys that must be present and non-empty.
    pub required_top_level: &'static [&'static str],
    /// Top-level scalar fields checked for URL-validity / placeholder text
    /// (used by endpoints with no nested item list, e.g. anime-detail).
    pub top_level_fields: &'static [Field],
    /// Nested collections, each validated item-by-item against `item_fields`.
    pub arrays: &'static [(ArrayShape, &'static [Field])],
}

const HOME: EndpointSchema = EndpointSchema {
    required_top_level: &["top10", "new_eps", "movies", "jadwal_rilis"],
    top_level_fields: &[],
    arrays: &[
        (ArrayShape::Array("top10"), &[s("judul"), u("url"), s("anime_slug"), u("cover")]),
        (ArrayShape::Array("new_eps"), &[s("judul"), u("url"), s("anime_slug"), u("cover")]),
        (ArrayShape::Array("movies"), &[s("judul"), u("url"), s("anime_slug"), u("cover")]),
    ],
};

const JADWAL_RILIS: EndpointSchema = EndpointSchema {
    required_top_level: &["data"],
    top_level_fields: &[],
    arrays: &[(
        ArrayShape::ObjectOfArrays("data"),
        &[s("title"), u("url"), s("anime_slug"), u("cover_url")],
    )],
};

const JADWAL_RILIS_DAY: EndpointSchema = EndpointSchema {
    required_top_level: &["data"],
    top_level_fields: &[],
    arrays: &[(ArrayShape::Array("data"), &[s("title"), u("url"), s("anime_slug"), u("cover_url")])],
};

const ANIME_TERBARU: EndpointSchema = EndpointSchema {
    required_top_level: &["data"],
    top_level_fields: &[],
    arrays: &[(ArrayShape::Array("data"), &[s("judul"), u("url"), s("anime_slug"), u("cover")])],
};

const MOVIE: EndpointSchema = EndpointSchema {
    required_top_level: &["data"],
    top_level_fields: &[],
    arrays: &[(ArrayShape::Array("data"), &[s("judul"), u("url"), s("anime_slug"), u("cover")])],
};

const ANIME_DETAIL: EndpointSchema = EndpointSchema {
    required_top_level: &["judul", "url", "anime_slug", "cover"],
    top_level_fields: &[s("judul"), u("url"), s("anime_slug"), u("cover")],
    arrays: &[],
};

const EPISODE_DETAIL: EndpointSchema = EndpointSchema {
    required_top_level: &["title", "thumbnail_url", "streaming_servers"],
    top_level_fields: &[s("title"), u("thumbnail_url")],
    arrays: &[(ArrayShape::Array("streaming_servers"), &[s("server_name"), u("streaming_url")])],
};

const SEARCH: EndpointSchema = EndpointSchema {
    required_top_level: &["data"],
    top_level_fields: &[],
    arrays: &[(ArrayShape::Array("data"), &[s("judul"), u("url"), s("anime_slug"), u("cover")])],
};

/// Resolve the schema for a literal routed endpoint path. Returns `None` for
/// paths outside the closed set (spec §4.4's table).
pub fn schema_for(endpoint: &str) -> Option<&'static EndpointSchema> {
    match endpoint {
        "/api/v1/home" => Some(&HOME),
        "/api/v1/jadwal-rilis" => Some(&JADWAL_RILIS),
        "/api/v1/anime-terbaru" => Some(&ANIME_TERBARU),
        "/api/v1/movie" => Some(&MOVIE),
        "/api/v1/anime-detail" => Some(&ANIME_DETAIL),
        "/api/v1/episode-detail" => Some(&EPISODE_DETAIL),
        "/api/v1/search" => Some(&SEARCH),
        _ if endpoint.starts_with("/api/v1/jadwal-rilis/") => Some(&JADWAL_RILIS_DAY),
        _ => None,
    }
}
