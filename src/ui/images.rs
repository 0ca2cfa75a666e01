//! Async terminal-image loading shared by the gallery views.
//!
//! Images decode and resize on background threads; completed loads
//! arrive over a channel drained once per frame. Entries are keyed by
//! record id rather than path, so a completion for a superseded load
//! can only warm the cache and never flips loading state for a
//! different record.

use image::{imageops::FilterType, DynamicImage};
use ratatui_image::{picker::Picker, protocol::StatefulProtocol};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc;

use crate::config::ImageProtocol;

pub struct ImageLoader {
    /// Image picker for protocol detection
    picker: Option<Picker>,
    cache: HashMap<String, StatefulProtocol>,
    /// Keys currently decoding on a background thread
    loading: HashSet<String>,
    receiver: mpsc::Receiver<(String, DynamicImage)>,
    sender: mpsc::Sender<(String, DynamicImage)>,
}

impl ImageLoader {
    pub fn new(protocol: ImageProtocol) -> Self {
        let picker = match protocol {
            ImageProtocol::None => None,
            _ => Picker::from_query_stdio().ok(),
        };
        let (tx, rx) = mpsc::channel();
        Self {
            picker,
            cache: HashMap::new(),
            loading: HashSet::new(),
            receiver: rx,
            sender: tx,
        }
    }

    /// Poll for completed async loads; call once per frame.
    pub fn poll(&mut self) {
        while let Ok((key, dyn_img)) = self.receiver.try_recv() {
            self.loading.remove(&key);
            if let Some(ref mut picker) = self.picker {
                let protocol = picker.new_resize_protocol(dyn_img);
                self.cache.insert(key, protocol);
            }
        }
    }

    /// Fetch the image for `key`, starting an async load on a miss.
    pub fn get(&mut self, key: &str, path: &str, max_size: u32) -> Option<&mut StatefulProtocol> {
        if self.cache.contains_key(key) {
            return self.cache.get_mut(key);
        }

        if !self.loading.contains(key) && self.picker.is_some() {
            self.loading.insert(key.to_string());
            let key = key.to_string();
            let path = PathBuf::from(path);
            let sender = self.sender.clone();

            std::thread::spawn(move || {
                if let Ok(img) = image::ImageReader::open(&path).and_then(|r| {
                    r.decode()
                        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
                }) {
                    let filter = if max_size >= 1024 {
                        FilterType::Lanczos3
                    } else {
                        FilterType::Triangle
                    };
                    let resized = img.resize(max_size, max_size, filter);
                    let _ = sender.send((key, resized));
                }
            });
        }

        None
    }

    pub fn is_loading(&self, key: &str) -> bool {
        self.loading.contains(key)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.loading.clear();
    }
}
