// lib/src/seed.rs

//! Reference data and demo hospitals for development environments.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use models::errors::AllocationResult;
use models::{
    specialty_code_from_name, BedStatus, NewBed, NewHospital, NewSpecialty, NewSpecialtyGroup,
    SpecialtyId,
};

use crate::engine::AllocationEngine;

const BED_RNG_SEED: u64 = 42;
const MIN_BEDS_PER_HOSPITAL: u32 = 24;
const EXTRA_BEDS_RANGE: u32 = 7;
const FALLBACK_SPECIALTY: &str = "GENM";

/// Specialty group name and the names of its specialties. Codes are derived from names.
const SPECIALTY_CATALOG: &[(&str, &[&str])] = &[
    ("Anaesthetics", &["Anaesthetics", "Intensive care medicine"]),
    ("Clinical oncology", &["Clinical oncology"]),
    (
        "Dental group",
        &[
            "Additional dental specialties",
            "Dental and maxillofacial radiology",
            "Endodontics",
            "Oral and maxillofacial surgery",
            "Oral and maxillofacial pathology",
            "Oral medicine",
            "Oral surgery",
            "Orthodontics",
            "Paediatric dentistry",
            "Periodontics",
            "Prosthodontics",
            "Restorative dentistry",
            "Special care dentistry",
        ],
    ),
    ("Emergency medicine", &["Emergency medicine"]),
    (
        "General medicine group",
        &[
            "Acute internal medicine",
            "Allergy",
            "Audio vestibular medicine",
            "Cardiology",
            "Clinical genetics",
            "Clinical neurophysiology",
            "Clinical pharmacology and therapeutics",
            "Dermatology",
            "Endocrinology and diabetes mellitus",
            "Gastroenterology",
            "General medicine",
            "General practice",
            "Genitourinary medicine",
            "Geriatric medicine",
            "Infectious diseases",
            "Medical oncology",
            "Medical ophthalmology",
            "Neurology",
            "Occupational medicine",
            "Palliative medicine",
            "Rehabilitation medicine",
            "Renal medicine",
            "Respiratory medicine",
            "Rheumatology",
            "Sport and exercise medicine",
        ],
    ),
    ("Obstetrics and gynaecology", &["Sexual and reproductive healthcare"]),
    ("Paediatric group", &["Paediatric cardiology", "Paediatrics"]),
    (
        "Pathology group",
        &[
            "Chemical pathology",
            "Diagnostic neuropathology",
            "Forensic histopathology",
            "General pathology",
            "Haematology",
            "Histopathology",
            "Immunology",
            "Medical microbiology",
            "Paediatric and perinatal pathology",
            "Virology",
        ],
    ),
    (
        "Prognosis and health management group",
        &[
            "Community health service dental",
            "Community health service medical",
            "Dental public health",
            "General dental practice",
            "Public health medicine",
        ],
    ),
    (
        "Psychiatry group",
        &[
            "Child and adolescent psychiatry",
            "Forensic psychiatry",
            "General psychiatry",
            "Old age psychiatry",
            "Psychiatry of learning disability",
            "Psychotherapy",
        ],
    ),
    ("Radiology group", &["Clinical radiology", "Nuclear medicine"]),
    (
        "Surgical group",
        &[
            "Cardiothoracic surgery",
            "General surgery",
            "Neurosurgery",
            "Ophthalmology",
            "Otolaryngology",
            "Paediatric surgery",
            "Plastic surgery",
            "Trauma and orthopaedic surgery",
            "Urology",
            "Vascular surgery",
        ],
    ),
];

/// Short codes used by the demo hospitals: (code, name, group name).
const SHORT_CODES: &[(&str, &str, &str)] = &[
    ("EMER", "Emergency", "Emergency medicine"),
    ("CARD", "Cardiology (acute)", "General medicine group"),
    ("GSUR", "General surgery (acute)", "Surgical group"),
    ("GENM", "General medicine (acute)", "General medicine group"),
    ("ORTH", "Orthopaedics", "Surgical group"),
    ("NEUR", "Neurology (acute)", "General medicine group"),
    ("ONCO", "Oncology", "Clinical oncology"),
    ("PED", "Paediatrics (acute)", "Paediatric group"),
    ("PSYC", "Psychiatry (acute)", "Psychiatry group"),
    ("DERM", "Dermatology (acute)", "General medicine group"),
];

struct DemoHospital {
    name: &'static str,
    city: &'static str,
    address: &'static str,
    postal_code: &'static str,
    latitude: f64,
    longitude: f64,
    phone_number: &'static str,
    specialty_codes: &'static [&'static str],
}

const DEMO_HOSPITALS: &[DemoHospital] = &[
    DemoHospital {
        name: "St Thomas' Hospital",
        city: "London",
        address: "Westminster Bridge Rd",
        postal_code: "SE1 7EH",
        latitude: 51.4980,
        longitude: -0.1170,
        phone_number: "+44 20 7188 7188",
        specialty_codes: &["EMER", "CARD", "GSUR", "GENM"],
    },
    DemoHospital {
        name: "Manchester Royal Infirmary",
        city: "Manchester",
        address: "Oxford Rd",
        postal_code: "M13 9WL",
        latitude: 53.4631,
        longitude: -2.2256,
        phone_number: "+44 161 276 1234",
        specialty_codes: &["EMER", "ORTH", "NEUR", "GENM"],
    },
    DemoHospital {
        name: "Queen Elizabeth Hospital Birmingham",
        city: "Birmingham",
        address: "Mindelsohn Way",
        postal_code: "B15 2WB",
        latitude: 52.4527,
        longitude: -1.9430,
        phone_number: "+44 121 627 2000",
        specialty_codes: &["EMER", "ONCO", "GSUR", "CARD"],
    },
    DemoHospital {
        name: "Queen Elizabeth University Hospital",
        city: "Glasgow",
        address: "1345 Govan Rd",
        postal_code: "G51 4TF",
        latitude: 55.8609,
        longitude: -4.3476,
        phone_number: "+44 141 201 1100",
        specialty_codes: &["EMER", "PED", "PSYC", "GENM"],
    },
    DemoHospital {
        name: "St James's University Hospital",
        city: "Leeds",
        address: "Beckett St",
        postal_code: "LS9 7TF",
        latitude: 53.8067,
        longitude: -1.5200,
        phone_number: "+44 113 243 3144",
        specialty_codes: &["EMER", "DERM", "ORTH", "GENM"],
    },
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub groups_created: usize,
    pub specialties_created: usize,
    pub hospitals_created: usize,
    pub beds_created: usize,
}

/// 70% available, 15% occupied, 10% maintenance, 5% reserved.
pub fn status_for_roll(roll: u32) -> BedStatus {
    match roll {
        0..=69 => BedStatus::Available,
        70..=84 => BedStatus::Occupied,
        85..=94 => BedStatus::Maintenance,
        _ => BedStatus::Reserved,
    }
}

pub struct DataInitializer<'a> {
    engine: &'a AllocationEngine,
}

impl<'a> DataInitializer<'a> {
    pub fn new(engine: &'a AllocationEngine) -> Self {
        DataInitializer { engine }
    }

    /// Safe to run repeatedly: existing specialties are kept and hospitals are
    /// only created into an empty store.
    pub async fn run(&self) -> AllocationResult<SeedReport> {
        info!("[DataInitializer] seeding reference data");
        let mut report = SeedReport::default();
        self.seed_specialties(&mut report).await?;
        self.seed_hospitals_and_beds(&mut report).await?;
        self.engine.flush().await?;
        info!("[DataInitializer] done: {:?}", report);
        Ok(report)
    }

    async fn ensure_group(&self, name: &str, report: &mut SeedReport) -> AllocationResult<String> {
        let code = specialty_code_from_name(name);
        if self.engine.store().find_specialty_group_by_code(&code).await?.is_none() {
            self.engine
                .specialties()
                .create_group(NewSpecialtyGroup {
                    code: code.clone(),
                    name: name.to_string(),
                    description: None,
                })
                .await?;
            report.groups_created += 1;
        }
        Ok(code)
    }

    async fn ensure_specialty(
        &self,
        code: String,
        name: &str,
        group_name: &str,
        group_code: &str,
        report: &mut SeedReport,
    ) -> AllocationResult<()> {
        if self.engine.store().find_specialty_by_code(&code).await?.is_some() {
            return Ok(());
        }
        self.engine
            .specialties()
            .create(NewSpecialty {
                code,
                name: name.to_string(),
                group_code: group_code.to_string(),
                description: Some(format!("Specialty: {} (group: {})", name, group_name)),
            })
            .await?;
        report.specialties_created += 1;
        Ok(())
    }

    async fn seed_specialties(&self, report: &mut SeedReport) -> AllocationResult<()> {
        for (group_name, specialties) in SPECIALTY_CATALOG {
            let group_code = self.ensure_group(group_name, report).await?;
            for name in specialties.iter() {
                self.ensure_specialty(specialty_code_from_name(name), name, group_name, &group_code, report)
                    .await?;
            }
        }
        for (code, name, group_name) in SHORT_CODES {
            let group_code = self.ensure_group(group_name, report).await?;
            self.ensure_specialty(code.to_string(), name, group_name, &group_code, report)
                .await?;
        }
        info!(
            "[DataInitializer] {} specialty groups and {} specialties created",
            report.groups_created, report.specialties_created
        );
        Ok(())
    }

    async fn resolve_codes(&self, hospital: &DemoHospital) -> AllocationResult<Vec<SpecialtyId>> {
        let mut ids = Vec::with_capacity(hospital.specialty_codes.len());
        for code in hospital.specialty_codes {
            match self.engine.store().find_specialty_by_code(code).await? {
                Some(specialty) => ids.push(specialty.id),
                None => warn!("[DataInitializer] unknown specialty {} ignored for {}", code, hospital.name),
            }
        }
        if ids.is_empty() {
            if let Some(fallback) = self.engine.store().find_specialty_by_code(FALLBACK_SPECIALTY).await? {
                ids.push(fallback.id);
            }
        }
        Ok(ids)
    }

    async fn seed_hospitals_and_beds(&self, report: &mut SeedReport) -> AllocationResult<()> {
        let existing = self.engine.store().list_hospitals().await?;
        if !existing.is_empty() {
            info!(
                "[DataInitializer] {} hospitals already present, skipping hospital and bed creation",
                existing.len()
            );
            return Ok(());
        }

        let mut rng = StdRng::seed_from_u64(BED_RNG_SEED);
        for demo in DEMO_HOSPITALS {
            let specialty_ids = self.resolve_codes(demo).await?;
            let bed_count = MIN_BEDS_PER_HOSPITAL + rng.gen_range(0..EXTRA_BEDS_RANGE);
            let hospital = self
                .engine
                .hospitals()
                .create(NewHospital {
                    name: demo.name.to_string(),
                    address: Some(demo.address.to_string()),
                    city: demo.city.to_string(),
                    postal_code: Some(demo.postal_code.to_string()),
                    phone_number: Some(demo.phone_number.to_string()),
                    latitude: demo.latitude,
                    longitude: demo.longitude,
                    total_beds: Some(bed_count),
                    active: Some(true),
                    specialty_ids: specialty_ids.clone(),
                })
                .await?;
            report.hospitals_created += 1;

            if specialty_ids.is_empty() {
                warn!("[DataInitializer] no specialty for {}, no beds created", demo.name);
                continue;
            }
            for i in 1..=bed_count {
                let index = (i - 1) as usize;
                let status = status_for_roll(rng.gen_range(0..100));
                self.engine
                    .beds()
                    .create(NewBed {
                        hospital_id: hospital.id,
                        specialty_id: specialty_ids[index % specialty_ids.len()],
                        bed_number: format!("{:03}", i),
                        room_number: Some(format!("R{:02}", (i - 1) / 2 + 1)),
                        floor: Some(1 + ((i - 1) / 10) as i32),
                        status: Some(status),
                    })
                    .await?;
                report.beds_created += 1;
            }
        }
        info!(
            "[DataInitializer] {} hospitals and {} beds created",
            report.hospitals_created, report.beds_created
        );
        Ok(())
    }
}
