use std::sync::{Arc, PoisonError, RwLock};

use crate::shared::face_profile::FaceProfile;

/// The known-face set shared by the recognition and sampling loops.
///
/// Readers take an immutable snapshot; writers build a new set and swap it
/// in, so a reader sees either the whole pre-update or the whole
/// post-update set and never a partially written profile.
#[derive(Default)]
pub struct ProfileGallery {
    profiles: RwLock<Arc<Vec<FaceProfile>>>,
}

impl ProfileGallery {
    /// Builds a gallery, keeping the last profile for any duplicated name.
    pub fn new(profiles: Vec<FaceProfile>) -> Self {
        Self {
            profiles: RwLock::new(Arc::new(dedup_by_name(profiles))),
        }
    }

    pub fn snapshot(&self) -> Arc<Vec<FaceProfile>> {
        self.profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, name: &str) -> Option<FaceProfile> {
        self.snapshot().iter().find(|p| p.name == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Inserts `profile`, replacing any existing profile with the same name
    /// in place. Returns `true` when an existing profile was replaced.
    pub fn upsert(&self, profile: FaceProfile) -> bool {
        let mut guard = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
        let mut next: Vec<FaceProfile> = (**guard).clone();
        let replaced = match next.iter_mut().find(|p| p.name == profile.name) {
            Some(existing) => {
                *existing = profile;
                true
            }
            None => {
                next.push(profile);
                false
            }
        };
        *guard = Arc::new(next);
        replaced
    }

    /// Removes the profile named `name`. Returns `true` if one was removed.
    pub fn remove(&self, name: &str) -> bool {
        let mut guard = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
        if !guard.iter().any(|p| p.name == name) {
            return false;
        }
        let next: Vec<FaceProfile> = guard.iter().filter(|p| p.name != name).cloned().collect();
        *guard = Arc::new(next);
        true
    }

    pub fn replace_all(&self, profiles: Vec<FaceProfile>) {
        let next = Arc::new(dedup_by_name(profiles));
        *self.profiles.write().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

fn dedup_by_name(profiles: Vec<FaceProfile>) -> Vec<FaceProfile> {
    let mut out: Vec<FaceProfile> = Vec::with_capacity(profiles.len());
    for p in profiles {
        match out.iter_mut().find(|existing| existing.name == p.name) {
            Some(existing) => *existing = p,
            None => out.push(p),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::vector_math::Embedding;

    fn profile(name: &str, v: f32) -> FaceProfile {
        FaceProfile::new(name, Embedding::new(vec![v, 0.0]))
    }

    #[test]
    fn test_new_deduplicates_names_keeping_last() {
        let gallery = ProfileGallery::new(vec![profile("a", 1.0), profile("a", 2.0)]);
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.get("a").unwrap().embedding.values()[0], 2.0);
    }

    #[test]
    fn test_upsert_inserts_then_replaces() {
        let gallery = ProfileGallery::default();
        assert!(!gallery.upsert(profile("a", 1.0)));
        assert!(gallery.upsert(profile("a", 3.0)));
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.get("a").unwrap().embedding.values()[0], 3.0);
    }

    #[test]
    fn test_snapshot_unaffected_by_later_writes() {
        let gallery = ProfileGallery::new(vec![profile("a", 1.0)]);
        let before = gallery.snapshot();
        gallery.upsert(profile("b", 2.0));
        gallery.upsert(profile("a", 9.0));

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].embedding.values()[0], 1.0);
        assert_eq!(gallery.snapshot().len(), 2);
    }

    #[test]
    fn test_remove() {
        let gallery = ProfileGallery::new(vec![profile("a", 1.0), profile("b", 2.0)]);
        assert!(gallery.remove("a"));
        assert!(!gallery.remove("a"));
        assert!(gallery.get("a").is_none());
        assert_eq!(gallery.len(), 1);
    }

    #[test]
    fn test_replace_all() {
        let gallery = ProfileGallery::new(vec![profile("a", 1.0)]);
        gallery.replace_all(vec![profile("x", 1.0), profile("y", 2.0)]);
        let names: Vec<_> = gallery.snapshot().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn test_concurrent_readers_see_whole_sets() {
        let gallery = Arc::new(ProfileGallery::new(vec![profile("a", 1.0)]));
        let writer = {
            let g = Arc::clone(&gallery);
            std::thread::spawn(move || {
                for i in 0..100 {
                    g.replace_all(vec![profile("a", i as f32), profile("b", i as f32)]);
                }
            })
        };
        for _ in 0..100 {
            let snap = gallery.snapshot();
            // Either the initial single profile or a full two-profile set
            // with matching generations.
            if snap.len() == 2 {
                assert_eq!(snap[0].embedding.values()[0], snap[1].embedding.values()[0]);
            } else {
                assert_eq!(snap.len(), 1);
            }
        }
        writer.join().unwrap();
    }
}
