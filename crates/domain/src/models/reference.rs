//! Static reference data for filters and seeding.
//!
//! Spanish autonomous communities with their main cities, and the curated
//! tag vocabulary offered to organizers.

/// Autonomous community → cities.
pub static LOCATION_DATA: &[(&str, &[&str])] = &[
    (
        "Andalucía",
        &[
            "Sevilla",
            "Málaga",
            "Granada",
            "Córdoba",
            "Cádiz",
            "Huelva",
            "Jaén",
            "Almería",
            "Marbella",
            "Jerez de la Frontera",
            "Dos Hermanas",
        ],
    ),
    ("Aragón", &["Zaragoza", "Huesca", "Teruel"]),
    ("Principado de Asturias", &["Oviedo", "Gijón", "Avilés"]),
    ("Balears, Illes", &["Palma de Mallorca", "Ibiza", "Manacor"]),
    (
        "Canarias",
        &["Las Palmas de Gran Canaria", "Santa Cruz de Tenerife", "La Laguna"],
    ),
    ("Cantabria", &["Santander", "Torrelavega", "Castro Urdiales"]),
    (
        "Castilla y León",
        &[
            "Valladolid",
            "León",
            "Burgos",
            "Salamanca",
            "Segovia",
            "Ávila",
            "Palencia",
            "Zamora",
            "Soria",
        ],
    ),
    (
        "Castilla - La Mancha",
        &[
            "Toledo",
            "Albacete",
            "Ciudad Real",
            "Guadalajara",
            "Cuenca",
            "Talavera de la Reina",
        ],
    ),
    (
        "Cataluña",
        &[
            "Barcelona",
            "Tarragona",
            "Girona",
            "Lleida",
            "L'Hospitalet de Llobregat",
            "Badalona",
            "Sabadell",
            "Terrassa",
        ],
    ),
    (
        "Comunitat Valenciana",
        &["Valencia", "Alicante", "Castellón de la Plana", "Elche", "Benidorm"],
    ),
    ("Extremadura", &["Badajoz", "Cáceres", "Mérida"]),
    (
        "Galicia",
        &[
            "A Coruña",
            "Vigo",
            "Santiago de Compostela",
            "Lugo",
            "Ourense",
            "Pontevedra",
        ],
    ),
    (
        "Comunidad de Madrid",
        &[
            "Madrid",
            "Móstoles",
            "Alcalá de Henares",
            "Getafe",
            "Leganés",
            "Alcobendas",
        ],
    ),
    ("Región de Murcia", &["Murcia", "Cartagena", "Lorca"]),
    ("Navarra", &["Pamplona", "Tudela"]),
    (
        "País Vasco",
        &["Bilbao", "Vitoria-Gasteiz", "San Sebastián", "Barakaldo"],
    ),
    ("La Rioja", &["Logroño"]),
    ("Ceuta", &["Ceuta"]),
    ("Melilla", &["Melilla"]),
];

pub static CYBERSECURITY_TAGS: &[&str] = &[
    "Análisis de Malware",
    "Blockchain",
    "Blue Team",
    "Bootcamp",
    "Ciberinteligencia",
    "Competición",
    "Conferencia",
    "Contenedores (Docker, Kubernetes)",
    "Criptografía",
    "CTF (Capture The Flag)",
    "Cumplimiento (Compliance)",
    "Curso",
    "DevSecOps",
    "DFIR (Forense y Respuesta a Incidentes)",
    "Gobernanza (GRC)",
    "Hacking",
    "Hacking Ético",
    "Inteligencia Artificial (IA)",
    "Meetup",
    "Networking",
    "OSINT",
    "Pentesting",
    "Privacidad de Datos",
    "Purple Team",
    "Red Team",
    "Reversing",
    "Seguridad AWS",
    "Seguridad Azure",
    "Seguridad de Redes",
    "Seguridad Defensiva",
    "Seguridad en la Nube (Cloud Security)",
    "Seguridad GCP",
    "Seguridad IoT",
    "Seguridad Móvil (Android/iOS)",
    "Seguridad Ofensiva",
    "Seguridad OT / SCADA",
    "Taller",
    "Webinar",
];

/// Community a city belongs to, compared case-insensitively.
pub fn community_of(city: &str) -> Option<&'static str> {
    let city = city.trim().to_lowercase();
    LOCATION_DATA
        .iter()
        .find(|(_, cities)| cities.iter().any(|c| c.to_lowercase() == city))
        .map(|(community, _)| *community)
}

pub fn is_community(name: &str) -> bool {
    let name = name.trim().to_lowercase();
    LOCATION_DATA
        .iter()
        .any(|(community, _)| community.to_lowercase() == name)
}

/// Sorted community names.
pub fn autonomous_communities() -> Vec<&'static str> {
    let mut communities: Vec<&'static str> = LOCATION_DATA.iter().map(|(c, _)| *c).collect();
    communities.sort_unstable();
    communities
}

/// Sorted, de-duplicated city names across all communities.
pub fn all_cities() -> Vec<&'static str> {
    let mut cities: Vec<&'static str> = LOCATION_DATA
        .iter()
        .flat_map(|(_, cities)| cities.iter().copied())
        .collect();
    cities.sort_unstable();
    cities.dedup();
    cities
}

/// Communities and cities together, as offered by the location filter.
pub fn location_options() -> Vec<&'static str> {
    let mut options = autonomous_communities();
    options.extend(all_cities());
    options.sort_unstable();
    options.dedup();
    options
}
