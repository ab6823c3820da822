use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One prayer-time zone in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneEntry {
    pub code: String,
    pub state: String,
    pub description: String,
}

/// A zone as listed under its state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneOption {
    pub code: String,
    pub description: String,
}

/// All zones of one state, ordered by code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneGroup {
    pub state: String,
    pub zones: Vec<ZoneOption>,
}

/// Groups entries by state, sorted by state then code.
#[must_use]
pub fn group_zones(entries: &[ZoneEntry]) -> Vec<ZoneGroup> {
    let mut by_state: BTreeMap<&str, Vec<ZoneOption>> = BTreeMap::new();
    for entry in entries {
        by_state
            .entry(entry.state.as_str())
            .or_default()
            .push(ZoneOption {
                code: entry.code.clone(),
                description: entry.description.clone(),
            });
    }

    by_state
        .into_iter()
        .map(|(state, mut zones)| {
            zones.sort_by(|a, b| a.code.cmp(&b.code));
            ZoneGroup {
                state: state.to_string(),
                zones,
            }
        })
        .collect()
}

const BUILTIN_ZONES: &[(&str, &str, &str)] = &[
    ("JHR01", "Johor", "Pulau Aur dan Pulau Pemanggil"),
    ("JHR02", "Johor", "Johor Bahru, Kota Tinggi, Mersing, Kulai"),
    ("JHR03", "Johor", "Kluang, Pontian"),
    ("JHR04", "Johor", "Batu Pahat, Muar, Segamat, Gemas Johor, Tangkak"),
    ("KDH01", "Kedah", "Kota Setar, Kubang Pasu, Pokok Sena (Daerah Kecil)"),
    ("KDH02", "Kedah", "Kuala Muda, Yan, Pendang"),
    ("KDH03", "Kedah", "Padang Terap, Sik"),
    ("KDH04", "Kedah", "Baling"),
    ("KDH05", "Kedah", "Bandar Baharu, Kulim"),
    ("KDH06", "Kedah", "Langkawi"),
    ("KDH07", "Kedah", "Puncak Gunung Jerai"),
    (
        "KTN01",
        "Kelantan",
        "Bachok, Kota Bharu, Machang, Pasir Mas, Pasir Puteh, Tanah Merah, Tumpat, Kuala Krai, Mukim Chiku",
    ),
    (
        "KTN02",
        "Kelantan",
        "Gua Musang (Daerah Galas Dan Bertam), Jeli, Jajahan Kecil Lojing",
    ),
    ("MLK01", "Melaka", "Seluruh Negeri Melaka"),
    ("NGS01", "Negeri Sembilan", "Tampin, Jempol"),
    ("NGS02", "Negeri Sembilan", "Jelebu, Kuala Pilah, Rembau"),
    ("NGS03", "Negeri Sembilan", "Port Dickson, Seremban"),
    ("PHG01", "Pahang", "Pulau Tioman"),
    ("PHG02", "Pahang", "Kuantan, Pekan, Muadzam Shah"),
    ("PHG03", "Pahang", "Jerantut, Temerloh, Maran, Bera, Chenor, Jengka"),
    ("PHG04", "Pahang", "Bentong, Lipis, Raub"),
    ("PHG05", "Pahang", "Genting Sempah, Janda Baik, Bukit Tinggi"),
    ("PHG06", "Pahang", "Cameron Highlands, Genting Highlands, Bukit Fraser"),
    (
        "PHG07",
        "Pahang",
        "Zon Khas Daerah Rompin (Mukim Rompin, Mukim Endau, Mukim Pontian)",
    ),
    ("PLS01", "Perlis", "Kangar, Padang Besar, Arau"),
    ("PNG01", "Pulau Pinang", "Seluruh Negeri Pulau Pinang"),
    ("PRK01", "Perak", "Tapah, Slim River, Tanjung Malim"),
    ("PRK02", "Perak", "Kuala Kangsar, Sg. Siput, Ipoh, Batu Gajah, Kampar"),
    ("PRK03", "Perak", "Lenggong, Pengkalan Hulu, Grik"),
    ("PRK04", "Perak", "Temengor, Belum"),
    (
        "PRK05",
        "Perak",
        "Kg Gajah, Teluk Intan, Bagan Datuk, Seri Iskandar, Beruas, Parit, Lumut, Sitiawan, Pulau Pangkor",
    ),
    ("PRK06", "Perak", "Selama, Taiping, Bagan Serai, Parit Buntar"),
    ("PRK07", "Perak", "Bukit Larut"),
    (
        "SBH01",
        "Sabah",
        "Bahagian Sandakan (Timur), Bukit Garam, Semawang, Temanggong, Tambisan, Bandar Sandakan, Sukau",
    ),
    (
        "SBH02",
        "Sabah",
        "Beluran, Telupid, Pinangah, Terusan, Kuamut, Bahagian Sandakan (Barat)",
    ),
    (
        "SBH03",
        "Sabah",
        "Lahad Datu, Silabukan, Kunak, Sahabat, Semporna, Tungku, Bahagian Tawau (Timur)",
    ),
    (
        "SBH04",
        "Sabah",
        "Bandar Tawau, Balong, Merotai, Kalabakan, Bahagian Tawau (Barat)",
    ),
    (
        "SBH05",
        "Sabah",
        "Kudat, Kota Marudu, Pitas, Pulau Banggi, Bahagian Kudat",
    ),
    ("SBH06", "Sabah", "Gunung Kinabalu"),
    (
        "SBH07",
        "Sabah",
        "Kota Kinabalu, Ranau, Kota Belud, Tuaran, Penampang, Papar, Putatan, Bahagian Pantai Barat",
    ),
    (
        "SBH08",
        "Sabah",
        "Pensiangan, Keningau, Tambunan, Nabawan, Bahagian Pendalaman (Atas)",
    ),
    (
        "SBH09",
        "Sabah",
        "Beaufort, Kuala Penyu, Sipitang, Tenom, Long Pasia, Membakut, Weston, Bahagian Pendalaman (Bawah)",
    ),
    (
        "SGR01",
        "Selangor",
        "Gombak, Petaling, Sepang, Hulu Langat, Hulu Selangor, Shah Alam",
    ),
    ("SGR02", "Selangor", "Kuala Selangor, Sabak Bernam"),
    ("SGR03", "Selangor", "Klang, Kuala Langat"),
    ("SWK01", "Sarawak", "Limbang, Lawas, Sundar, Trusan"),
    ("SWK02", "Sarawak", "Miri, Niah, Bekenu, Sibuti, Marudi"),
    ("SWK03", "Sarawak", "Pandan, Belaga, Suai, Tatau, Sebauh, Bintulu"),
    (
        "SWK04",
        "Sarawak",
        "Sibu, Mukah, Dalat, Song, Igan, Oya, Balingian, Kanowit, Kapit",
    ),
    (
        "SWK05",
        "Sarawak",
        "Sarikei, Matu, Julau, Rajang, Daro, Bintangor, Belawai",
    ),
    (
        "SWK06",
        "Sarawak",
        "Lubok Antu, Sri Aman, Roban, Debak, Kabong, Lingga, Engkelili, Betong, Spaoh, Pusa, Saratok",
    ),
    ("SWK07", "Sarawak", "Serian, Simunjan, Samarahan, Sebuyau, Meludam"),
    ("SWK08", "Sarawak", "Kuching, Bau, Lundu, Sematan"),
    ("SWK09", "Sarawak", "Zon Khas (Kampung Patarikan)"),
    ("TRG01", "Terengganu", "Kuala Terengganu, Marang, Kuala Nerus"),
    ("TRG02", "Terengganu", "Besut, Setiu"),
    ("TRG03", "Terengganu", "Hulu Terengganu"),
    ("TRG04", "Terengganu", "Dungun, Kemaman"),
    ("WLY01", "Wilayah Persekutuan", "Kuala Lumpur, Putrajaya"),
    ("WLY02", "Wilayah Persekutuan", "Labuan"),
];

/// The JAKIM zone catalog bundled with the binary, used when the live
/// dropdown cannot be read.
#[must_use]
pub fn builtin_zones() -> Vec<ZoneEntry> {
    BUILTIN_ZONES
        .iter()
        .map(|&(code, state, description)| ZoneEntry {
            code: code.to_string(),
            state: state.to_string(),
            description: description.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn entry(code: &str, state: &str) -> ZoneEntry {
        ZoneEntry {
            code: code.to_string(),
            state: state.to_string(),
            description: format!("{code} area"),
        }
    }

    #[test]
    fn builtin_catalog_has_unique_codes() {
        let zones = builtin_zones();
        assert_eq!(zones.len(), 60);
        let codes: HashSet<_> = zones.iter().map(|z| z.code.as_str()).collect();
        assert_eq!(codes.len(), zones.len());
    }

    #[test]
    fn builtin_catalog_covers_every_state() {
        let groups = group_zones(&builtin_zones());
        assert_eq!(groups.len(), 14);
        let wp = groups
            .iter()
            .find(|g| g.state == "Wilayah Persekutuan")
            .unwrap();
        let codes: Vec<_> = wp.zones.iter().map(|z| z.code.as_str()).collect();
        assert_eq!(codes, ["WLY01", "WLY02"]);
    }

    #[test]
    fn group_zones_sorts_by_state_then_code() {
        let groups = group_zones(&[
            entry("SGR03", "Selangor"),
            entry("JHR02", "Johor"),
            entry("SGR01", "Selangor"),
            entry("JHR01", "Johor"),
        ]);

        let states: Vec<_> = groups.iter().map(|g| g.state.as_str()).collect();
        assert_eq!(states, ["Johor", "Selangor"]);
        let selangor: Vec<_> = groups[1].zones.iter().map(|z| z.code.as_str()).collect();
        assert_eq!(selangor, ["SGR01", "SGR03"]);
    }

    #[test]
    fn group_zones_of_empty_catalog_is_empty() {
        assert!(group_zones(&[]).is_empty());
    }
}
