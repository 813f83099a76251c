use url::form_urlencoded;

/// Query parameter marking a session request as resumable.
pub const UPLOAD_TYPE_PARAM: (&str, &str) = ("uploadType", "resumable");

/// Encode `params` as a query string, keeping their order.
pub fn build_query<K, V>(params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
        .finish()
}

/// URL of a resumable-session request: `{base}{file_id}?{params}&uploadType=resumable`.
pub fn session_url(base: &str, file_id: Option<&str>, params: &[(String, String)]) -> String {
    let mut url = base.to_string();
    if let Some(id) = file_id {
        url.push_str(id);
    }

    let mut all: Vec<(&str, &str)> = params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    all.push(UPLOAD_TYPE_PARAM);
    url.push('?');
    url.push_str(&build_query(&all));
    url
}
