mod kv;
mod mood_entries;
