use serde::{Deserialize, Serialize};

/// Storage buckets known to the platform. Each bucket ships a hard-coded
/// placeholder shown whenever a stored path cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Annonces,
    Evenements,
    Partenaires,
    Groupes,
    FaitsDivers,
    Rencontres,
    Avatars,
    Boutique,
}

/// Shown when not even a bucket is known for a piece of media.
pub const GENERIC_PLACEHOLDER_URL: &str = "https://cdn.onekamer.co/defaults/default_media.webp";

impl Bucket {
    pub const ALL: [Bucket; 8] = [
        Bucket::Annonces,
        Bucket::Evenements,
        Bucket::Partenaires,
        Bucket::Groupes,
        Bucket::FaitsDivers,
        Bucket::Rencontres,
        Bucket::Avatars,
        Bucket::Boutique,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Annonces => "annonces",
            Bucket::Evenements => "evenements",
            Bucket::Partenaires => "partenaires",
            Bucket::Groupes => "groupes",
            Bucket::FaitsDivers => "faits_divers",
            Bucket::Rencontres => "rencontres",
            Bucket::Avatars => "avatars",
            Bucket::Boutique => "boutique",
        }
    }

    pub fn placeholder_url(self) -> &'static str {
        match self {
            Bucket::Annonces => "https://cdn.onekamer.co/defaults/default_annonces.webp",
            Bucket::Evenements => "https://cdn.onekamer.co/defaults/default_evenements.webp",
            Bucket::Partenaires => "https://cdn.onekamer.co/defaults/default_partenaires.webp",
            Bucket::Groupes => "https://cdn.onekamer.co/defaults/default_groupes.webp",
            Bucket::FaitsDivers => "https://cdn.onekamer.co/defaults/default_faits_divers.webp",
            Bucket::Rencontres => "https://cdn.onekamer.co/defaults/default_rencontres.webp",
            Bucket::Avatars => "https://cdn.onekamer.co/defaults/default_avatars.webp",
            Bucket::Boutique => "https://cdn.onekamer.co/defaults/default_boutique.webp",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "annonces" => Ok(Bucket::Annonces),
            "evenements" => Ok(Bucket::Evenements),
            "partenaires" => Ok(Bucket::Partenaires),
            "groupes" => Ok(Bucket::Groupes),
            "faits_divers" => Ok(Bucket::FaitsDivers),
            "rencontres" => Ok(Bucket::Rencontres),
            "avatars" => Ok(Bucket::Avatars),
            "boutique" => Ok(Bucket::Boutique),
            _ => Err(format!("unknown bucket: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for bucket in Bucket::ALL {
            assert_eq!(bucket.as_str().parse::<Bucket>(), Ok(bucket));
        }
    }

    #[test]
    fn test_every_bucket_has_a_placeholder() {
        for bucket in Bucket::ALL {
            assert!(bucket.placeholder_url().starts_with("https://"));
        }
    }
}
