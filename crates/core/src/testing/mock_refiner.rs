//! Mock refiner for testing (C7).

use async_trait::async_trait;

use crate::refiner::{Refiner, RefinerError, RefinerOptions};
use crate::video::Video;

type Mutator = Box<dyn Fn(&mut Video) + Send + Sync>;

/// A refiner whose behaviour is entirely supplied by the test: optionally
/// mutate the video, optionally fail.
pub struct MockRefiner {
    name: String,
    mutate: Option<Mutator>,
    fail: bool,
}

impl MockRefiner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mutate: None,
            fail: false,
        }
    }

    pub fn with_mutation(mut self, mutate: impl Fn(&mut Video) + Send + Sync + 'static) -> Self {
        self.mutate = Some(Box::new(mutate));
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl Refiner for MockRefiner {
    fn name(&self) -> &str {
        &self.name
    }

    async fn refine(&self, video: &mut Video, _opts: &RefinerOptions) -> Result<(), RefinerError> {
        if self.fail {
            return Err(RefinerError::Parse("mock refiner configured to fail".to_string()));
        }
        if let Some(mutate) = &self.mutate {
            mutate(video);
        }
        Ok(())
    }
}

/// A stand-in for a real online-catalog refiner (`OmdbRefiner` and
/// friends): returns a fixed IMDB id rather than making an HTTP call. Skips
/// a video that already carries an id, same as `OmdbRefiner`, unless
/// `opts.force` is set.
pub struct MockOnlineDbRefiner {
    imdb_id: String,
}

impl MockOnlineDbRefiner {
    pub fn new(imdb_id: impl Into<String>) -> Self {
        Self { imdb_id: imdb_id.into() }
    }
}

#[async_trait]
impl Refiner for MockOnlineDbRefiner {
    fn name(&self) -> &str {
        "mock_online_db"
    }

    async fn refine(&self, video: &mut Video, opts: &RefinerOptions) -> Result<(), RefinerError> {
        match video {
            Video::Movie(movie) => {
                if movie.header.imdb_id.is_some() && !opts.force {
                    return Ok(());
                }
                movie.header.imdb_id = Some(self.imdb_id.clone());
            }
            Video::Episode(episode) => {
                if episode.series_imdb_id.is_some() && !opts.force {
                    return Ok(());
                }
                episode.series_imdb_id = Some(self.imdb_id.clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::{Movie, VideoHeader};

    fn movie_with_imdb_id(id: Option<&str>) -> Video {
        let mut video = Video::Movie(Movie {
            header: VideoHeader::new("a.mkv"),
            title: "Man of Steel".to_string(),
            year: Some(2013),
            alternative_titles: vec![],
        });
        if let Some(id) = id {
            video.header_mut().imdb_id = Some(id.to_string());
        }
        video
    }

    #[tokio::test]
    async fn skips_when_id_already_present() {
        let refiner = MockOnlineDbRefiner::new("tt9999999");
        let mut video = movie_with_imdb_id(Some("tt1111111"));
        refiner.refine(&mut video, &RefinerOptions::default()).await.unwrap();
        assert_eq!(video.header().imdb_id.as_deref(), Some("tt1111111"));
    }

    #[tokio::test]
    async fn force_overwrites_an_existing_id() {
        let refiner = MockOnlineDbRefiner::new("tt9999999");
        let mut video = movie_with_imdb_id(Some("tt1111111"));
        let opts = RefinerOptions { force: true, ..Default::default() };
        refiner.refine(&mut video, &opts).await.unwrap();
        assert_eq!(video.header().imdb_id.as_deref(), Some("tt9999999"));
    }

    #[tokio::test]
    async fn fills_in_a_missing_id() {
        let refiner = MockOnlineDbRefiner::new("tt9999999");
        let mut video = movie_with_imdb_id(None);
        refiner.refine(&mut video, &RefinerOptions::default()).await.unwrap();
        assert_eq!(video.header().imdb_id.as_deref(), Some("tt9999999"));
    }
}
