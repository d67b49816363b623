//! Prompt text used by the extraction pipeline.
//!
//! Centralized so tests (and operators reading logs) have a single source of
//! truth for what the model is told. The two exemplar pairs are few-shot
//! anchors for the nested question schema: the first shows lettered and
//! roman-numeral nesting, the second shows numeric-dotted nesting with a
//! rendered table and an `Image URL:` line carried into the answer.

/// Default system prompt. A per-document override (or a configured global
/// one) replaces this verbatim.
pub const SYSTEM_PROMPT: &str = "You are an AI assistant that understands and extract questions from a regulatory document submitted by an intervenor. Include Images given in the questions.  Do not skip the questions even if there are no nested sub questions, rather skip the nested sub question nodes when there are no sub questions under main question.";

/// First exemplar input: a data request with lettered sub-questions and
/// roman-numeral nested sub-questions under each main question.
pub const EXEMPLAR_1_INPUT: &str = "\
TEST SET OF DATA REQUESTS\n\
For Fuel\n\
Given the utility's historical emphasis on both traditional and renewable energy sources, it is essential to scrutinize the financial and operational aspects related to fuel procurement and distribution.\n\
1. Fuel Procurement and Cost Analysis\n\
a) Please provide a detailed breakdown of the cost structure associated with fuel procurement over the past decade, specifically distinguishing between traditional fossil fuels and renewable energy sources.\n\
i.\n\
What percentage of the total fuel procurement budget was allocated to renewable energy sources each year?\n\
ii.\n\
How has the cost per unit of fuel evolved over the years for both traditional and renewable sources?\n\
iii.\n\
What suppliers and partners have been involved in the procurement process for both types of fuel?\n\
2. Operational Efficiency and Environmental Impact\n\
a) Describe the measures taken to improve operational efficiency in fuel usage.\n\
i.\n\
How have these measures impacted the overall fuel consumption and associated costs?\n\
ii.\n\
Provide data on the reduction in greenhouse gas emissions resulting from these efficiency improvements.\n";

/// First exemplar output: one `data` entry per main question, shared context
/// repeated into each entry.
pub const EXEMPLAR_1_OUTPUT: &str = r#"{
  "data": [
    {
      "context": "Given the utility's historical emphasis on both traditional and renewable energy sources, it is essential to scrutinize the financial and operational aspects related to fuel procurement and distribution.",
      "questions": [
        {
          "mainquestion": "1. Fuel Procurement and Cost Analysis",
          "nested1subquestion1": "a) Please provide a detailed breakdown of the cost structure associated with fuel procurement over the past decade, specifically distinguishing between traditional fossil fuels and renewable energy sources.",
          "subquestions": [
            {
              "nested2subquestion1": "i. What percentage of the total fuel procurement budget was allocated to renewable energy sources each year?"
            },
            {
              "nested2subquestion2": "ii. How has the cost per unit of fuel evolved over the years for both traditional and renewable sources?"
            },
            {
              "nested2subquestion3": "iii. What suppliers and partners have been involved in the procurement process for both types of fuel?"
            }
          ]
        }
      ]
    },
    {
      "context": "Given the utility's historical emphasis on both traditional and renewable energy sources, it is essential to scrutinize the financial and operational aspects related to fuel procurement and distribution.",
      "questions": [
        {
          "mainquestion": "2. Operational Efficiency and Environmental Impact",
          "nested1subquestion1": "a) Describe the measures taken to improve operational efficiency in fuel usage.",
          "subquestions": [
            {
              "nested2subquestion1": "i. How have these measures impacted the overall fuel consumption and associated costs?"
            },
            {
              "nested2subquestion2": "ii. Provide data on the reduction in greenhouse gas emissions resulting from these efficiency improvements."
            }
          ]
        }
      ]
    }
  ]
}"#;

/// Second exemplar input: numeric-dotted question numbering in a non-uniform
/// layout, with a rendered table (and its trigger sentence) and an
/// `Image URL:` line inside question bodies.
pub const EXEMPLAR_2_INPUT: &str = "\
DATA REQUEST QUESTIONS\n\
THEIR NON-UNIFORM FORMAT OF QUESTIONS RECEIVED FROM THE INTERVENORS\n\
10. 1\n\
Early observations of the utility and its electric supply evolution:\n\
10. 1.1\n\
Static Electricity: Thales of Miletus discovered static electricity by rubbing amber with fur around 600 BCE.\n\
10. 1.1.1\n\
For each cultural significance: natural electric phenomena were often considered divine and used in religious rituals.\n\
\nTable #1\n\
| Country | Energy Consumption Increase (%) |\n\
|---|---|\n\
| USA | 15 |\n\
|---|---|\n\
| China | 25 |\n\
|---|---|\n\
This table shows the percentage increase in energy consumption by various countries over the last five years.\n\
10.2\n\
Please provide reasons for the variation in the below graph:\n\
Annual Energy Consumption Increase by Countries (Last 5 Years)\n\
Image URL: https://example.blob.core.windows.net/images/Intervenor2_Data%20Request%20Template.pdf_3.1.png\n";

/// Second exemplar output: no shared context, trailing table sentence and the
/// image URL folded into the question text.
pub const EXEMPLAR_2_OUTPUT: &str = r#"{
  "data": [
    {
      "questions": [
        {
          "mainquestion": "10. 1 Early observations of the utility and its electric supply evolution:",
          "nested1subquestion1": "10. 1.1 Static Electricity: Thales of Miletus discovered static electricity by rubbing amber with fur around 600 BCE.",
          "subquestions": [
            {
              "nested2subquestion1": "10. 1.1.1 For each cultural significance: natural electric phenomena were often considered divine and used in religious rituals. This table shows the percentage increase in energy consumption by various countries over the last five years."
            }
          ]
        }
      ]
    },
    {
      "questions": [
        {
          "mainquestion": "10.2 Please provide reasons for the variation in the below graph: Annual Energy Consumption Increase by Countries (Last 5 Years) Image URL: https://example.blob.core.windows.net/images/Intervenor2_Data%20Request%20Template.pdf_3.1.png"
        }
      ]
    }
  ]
}"#;
