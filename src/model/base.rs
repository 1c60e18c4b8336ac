//! Administrative resources: who and where.

use super::datatypes::{
    Address, Attachment, CodeableConcept, Coding, ContactPoint, Duration, HumanName, Identifier,
    Period, Reference,
};
use crate::primitives::{Code, Date, DateTime};
use crate::{fhir_choice, fhir_structure};

fhir_structure! {
    domain_resource Patient {
        identifier: repeated Identifier = "identifier" [summary],
        active: optional bool = "active" [summary],
        name: repeated HumanName = "name" [summary],
        telecom: repeated ContactPoint = "telecom" [summary],
        gender: optional Code = "gender" [summary],
        birth_date: optional Date = "birthDate" [summary],
        deceased: choice DeceasedChoice = "deceased" [summary],
        address: repeated Address = "address" [summary],
        marital_status: optional CodeableConcept = "maritalStatus",
        multiple_birth: choice MultipleBirthChoice = "multipleBirth",
        photo: repeated Attachment = "photo",
        contact: repeated PatientContact = "contact",
        communication: repeated PatientCommunication = "communication",
        general_practitioner: repeated Reference = "generalPractitioner",
        managing_organization: optional Reference = "managingOrganization" [summary],
        link: repeated PatientLink = "link" [summary],
    }
}

fhir_choice! {
    DeceasedChoice {
        Boolean(bool) = "Boolean",
        DateTime(DateTime) = "DateTime",
    }
}

fhir_choice! {
    MultipleBirthChoice {
        Boolean(bool) = "Boolean",
        Integer(i32) = "Integer",
    }
}

fhir_structure! {
    backbone PatientContact {
        relationship: repeated CodeableConcept = "relationship",
        name: optional HumanName = "name",
        telecom: repeated ContactPoint = "telecom",
        address: optional Address = "address",
        gender: optional Code = "gender",
        organization: optional Reference = "organization",
        period: optional Period = "period",
    }
}

fhir_structure! {
    backbone PatientCommunication {
        language: required CodeableConcept = "language",
        preferred: optional bool = "preferred",
    }
}

fhir_structure! {
    backbone PatientLink {
        other: required Reference = "other" [summary],
        type_: required Code = "type" [summary],
    }
}

impl Patient {
    /// Deceased, either flagged or dated.
    pub fn is_deceased(&self) -> bool {
        match &self.deceased {
            Some(DeceasedChoice::Boolean(flag)) => *flag,
            Some(DeceasedChoice::DateTime(_)) => true,
            None => false,
        }
    }

    /// `family, given given` of the first name, if any.
    pub fn display_name(&self) -> Option<String> {
        let name = self.name.first()?;
        if let Some(text) = &name.text {
            return Some(text.clone());
        }
        let given = name.given.join(" ");
        match (&name.family, given.is_empty()) {
            (Some(family), true) => Some(family.clone()),
            (Some(family), false) => Some(format!("{family}, {given}")),
            (None, false) => Some(given),
            (None, true) => None,
        }
    }
}

fhir_structure! {
    domain_resource Practitioner {
        identifier: repeated Identifier = "identifier" [summary],
        active: optional bool = "active" [summary],
        name: repeated HumanName = "name" [summary],
        telecom: repeated ContactPoint = "telecom" [summary],
        address: repeated Address = "address" [summary],
        gender: optional Code = "gender" [summary],
        birth_date: optional Date = "birthDate" [summary],
        photo: repeated Attachment = "photo",
        qualification: repeated PractitionerQualification = "qualification",
        communication: repeated CodeableConcept = "communication",
    }
}

fhir_structure! {
    backbone PractitionerQualification {
        identifier: repeated Identifier = "identifier",
        code: required CodeableConcept = "code",
        period: optional Period = "period",
        issuer: optional Reference = "issuer",
    }
}

fhir_structure! {
    domain_resource Organization {
        identifier: repeated Identifier = "identifier" [summary],
        active: optional bool = "active" [summary],
        type_: repeated CodeableConcept = "type" [summary],
        name: optional String = "name" [summary],
        alias: repeated String = "alias",
        telecom: repeated ContactPoint = "telecom",
        address: repeated Address = "address",
        part_of: optional Reference = "partOf" [summary],
        contact: repeated OrganizationContact = "contact",
        endpoint: repeated Reference = "endpoint",
    }
}

fhir_structure! {
    backbone OrganizationContact {
        purpose: optional CodeableConcept = "purpose",
        name: optional HumanName = "name",
        telecom: repeated ContactPoint = "telecom",
        address: optional Address = "address",
    }
}

fhir_structure! {
    domain_resource Encounter {
        identifier: repeated Identifier = "identifier" [summary],
        status: required Code = "status" [summary],
        status_history: repeated EncounterStatusHistory = "statusHistory",
        class: required Coding = "class" [summary],
        type_: repeated CodeableConcept = "type" [summary],
        service_type: optional CodeableConcept = "serviceType" [summary],
        priority: optional CodeableConcept = "priority",
        subject: optional Reference = "subject" [summary],
        participant: repeated EncounterParticipant = "participant" [summary],
        period: optional Period = "period",
        length: optional Duration = "length",
        reason_code: repeated CodeableConcept = "reasonCode" [summary],
        reason_reference: repeated Reference = "reasonReference" [summary],
        diagnosis: repeated EncounterDiagnosis = "diagnosis" [summary],
        service_provider: optional Reference = "serviceProvider",
        part_of: optional Reference = "partOf",
    }
}

fhir_structure! {
    backbone EncounterStatusHistory {
        status: required Code = "status",
        period: required Period = "period",
    }
}

fhir_structure! {
    backbone EncounterParticipant {
        type_: repeated CodeableConcept = "type" [summary],
        period: optional Period = "period",
        individual: optional Reference = "individual" [summary],
    }
}

fhir_structure! {
    backbone EncounterDiagnosis {
        condition: required Reference = "condition" [summary],
        use_: optional CodeableConcept = "use",
        rank: optional u32 = "rank",
    }
}
