pub(crate) mod ndjson;
